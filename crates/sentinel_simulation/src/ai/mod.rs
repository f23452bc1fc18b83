//! AI decision-making module
//!
//! FSM патрульного агента: Roam → Attack → Search (→ Roam), плюс
//! принудительный Chase при выходе цели за границу карты.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::{
    AIConfig, AIState, AITimers, LastKnownTargetPosition, NodeMemory, ScanPhase, ScanRoutine,
};
pub use events::MotionTelemetry;
pub use systems::{
    advance_scan_routines, border_override, choose_patrol_node, collect_patrol_nodes,
    publish_motion_telemetry, state_behavior, state_transitions,
};

/// AI Plugin
///
/// Регистрирует системы decision core в FixedUpdate. Порядок — это порядок
/// тика из контракта FSM:
/// 1. border_override — принудительный Chase до per-state логики
/// 2. state_behavior — действие текущего состояния + профиль скорости
/// 3. advance_scan_routines — многотиковая процедура осмотра
/// 4. state_transitions — один отсчёт perception, гистерезис, переходы
/// 5. publish_motion_telemetry — скорость для анимационного слоя
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MotionTelemetry>().add_systems(
            FixedUpdate,
            (
                systems::border_override,
                systems::state_behavior,
                systems::advance_scan_routines,
                systems::state_transitions,
                systems::publish_motion_telemetry,
            )
                .chain(), // Последовательное выполнение для детерминизма
        );
    }
}
