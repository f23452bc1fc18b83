//! Телеметрия движения для анимационного слоя.

use bevy::prelude::*;

use crate::ai::events::MotionTelemetry;
use crate::components::{Agent, NavAgent};

/// Система: публикация |velocity| каждого агента
///
/// Чистый sink: подписчиков может не быть, на решения ядра не влияет.
pub fn publish_motion_telemetry(
    agents: Query<(Entity, &NavAgent), With<Agent>>,
    mut telemetry: EventWriter<MotionTelemetry>,
) {
    for (entity, nav) in agents.iter() {
        telemetry.write(MotionTelemetry {
            entity,
            speed: nav.velocity.length(),
        });
    }
}
