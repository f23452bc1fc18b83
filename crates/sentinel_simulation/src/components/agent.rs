//! Маркеры сущностей: Agent, Target, PatrolNode

use bevy::prelude::*;

use crate::ai::{AIConfig, AIState, AITimers, LastKnownTargetPosition, NodeMemory};
use crate::components::navigation::NavAgent;
use crate::perception::VisionConfig;

/// Патрульный агент — носитель decision core
///
/// Через Required Components автоматически получает состояние FSM, таймеры,
/// память узлов и зеркало навигации. Несколько агентов работают независимо:
/// всё mutable-состояние лежит в компонентах, глобальных полей нет.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    AIState,
    AITimers,
    NodeMemory,
    LastKnownTargetPosition,
    NavAgent,
    AIConfig,
    VisionConfig,
    Transform
)]
pub struct Agent;

/// Отслеживаемая цель (игрок)
///
/// Ядро ожидает ровно одну Target-сущность; её отсутствие — конфигурационная
/// ошибка (`AIError::MissingTarget`), а не тихий no-op.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Target;

/// Фиксированный патрульный узел (waypoint)
///
/// Узлы спавнятся на setup и в рантайме не создаются/не удаляются.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolNode;
