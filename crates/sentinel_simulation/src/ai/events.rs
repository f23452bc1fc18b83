//! AI Events — исходящие события для tactical-слоя

use bevy::prelude::*;

/// Телеметрия движения для анимации/дисплея
///
/// Ядро публикует текущую величину скорости каждого агента раз в тик;
/// поведенческой связи нет — подписчик может отсутствовать.
#[derive(Event, Debug, Clone)]
pub struct MotionTelemetry {
    /// Агент, чью скорость репортим
    pub entity: Entity,
    /// |velocity| по данным навигационного исполнителя
    pub speed: f32,
}
