//! FSM systems: принудительный Chase, per-state поведение, переходы.

use bevy::prelude::*;

use crate::ai::components::{
    AIConfig, AIState, AITimers, LastKnownTargetPosition, NodeMemory, ScanRoutine,
};
use crate::components::{Agent, NavAgent, PatrolNode, Target};
use crate::error::AIError;
use crate::logger;
use crate::perception::{target_visible, SpatialQueryService, VisionConfig};
use crate::DeterministicRng;

use super::patrol::{collect_patrol_nodes, request_next_patrol_node};

/// Горизонтальная дистанция точки от origin карты (Y игнорируем)
fn horizontal_distance_from_origin(point: Vec3) -> f32 {
    Vec3::new(point.x, 0.0, point.z).length()
}

/// Система: глобальный override границы карты
///
/// Выполняется ДО per-state логики каждый тик: цель за `map_border` →
/// принудительный Chase из любого состояния. Активный осмотр при этом
/// отменяется явно (снимаем ScanRoutine).
pub fn border_override(
    mut agents: Query<(Entity, &mut AIState, &AIConfig, Has<ScanRoutine>), With<Agent>>,
    targets: Query<&Transform, With<Target>>,
    mut commands: Commands,
) {
    let Ok(target_transform) = targets.single() else {
        logger::log_error(&format!("AI: {}", AIError::MissingTarget));
        return;
    };
    let target_distance = horizontal_distance_from_origin(target_transform.translation);

    for (entity, mut state, config, scanning) in agents.iter_mut() {
        if target_distance <= config.map_border || *state == AIState::Chase {
            continue;
        }

        logger::log_info(&format!(
            "AI: {:?} target exited map border ({:.1} > {:.1}) → Chase",
            entity, target_distance, config.map_border
        ));
        *state = AIState::Chase;
        if scanning {
            commands.entity(entity).remove::<ScanRoutine>();
        }
    }
}

/// Система: per-state действие текущего тика
///
/// - Roam: базовая скорость; при простое навигации — следующий узел патруля
/// - Attack: высокая скорость; каждый тик destination = живая позиция цели,
///   обновляем LastKnownTargetPosition
/// - Search: пониженная скорость; при простое и отсутствии активного
///   осмотра — старт ScanRoutine
/// - Chase: максимальная скорость + буст ускорения/разворота; destination =
///   живая позиция цели (LastKnown тоже ведём — нужен точке поиска при
///   возврате цели в границу)
pub fn state_behavior(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &AIState,
            &AIConfig,
            &mut NavAgent,
            &mut NodeMemory,
            &mut LastKnownTargetPosition,
            Has<ScanRoutine>,
        ),
        With<Agent>,
    >,
    nodes: Query<(Entity, &Transform), With<PatrolNode>>,
    targets: Query<&Transform, With<Target>>,
    mut rng: ResMut<DeterministicRng>,
    mut commands: Commands,
) {
    let Ok(target_transform) = targets.single() else {
        logger::log_error(&format!("AI: {}", AIError::MissingTarget));
        return;
    };
    let target_position = target_transform.translation;

    for (entity, transform, state, config, mut nav, mut memory, mut last_known, scanning) in
        agents.iter_mut()
    {
        match state {
            AIState::Roam => {
                nav.speed = config.roam_speed;
                if nav.is_idle(config.roam_arrive_distance) {
                    let node_set =
                        collect_patrol_nodes(nodes.iter().map(|(e, t)| (e, t.translation)));
                    request_next_patrol_node(
                        entity,
                        transform.translation,
                        &node_set,
                        &mut nav,
                        &mut memory,
                        config,
                        &mut rng.rng,
                    );
                }
            }

            AIState::Attack => {
                nav.speed = config.attack_speed;
                nav.set_destination(target_position);
                last_known.0 = target_position;
            }

            AIState::Search => {
                nav.speed = config.search_speed;
                if nav.is_idle(config.search_arrive_distance) && !scanning {
                    if let Some(&first_offset) = config.scan_offsets.first() {
                        let yaw = transform.rotation.to_euler(EulerRot::YXZ).0;
                        commands
                            .entity(entity)
                            .insert(ScanRoutine::start(yaw, first_offset));
                    }
                }
            }

            AIState::Chase => {
                nav.speed = config.chase_speed;
                nav.acceleration = config.chase_acceleration;
                nav.angular_speed = config.chase_angular_speed;
                nav.set_destination(target_position);
                last_known.0 = target_position;
            }
        }
    }
}

/// Система: переходы FSM (после per-state действия)
///
/// Один отсчёт perception на агента за тик питает оба sight-таймера;
/// пороги гистерезиса зависят от состояния (`AITimers::continuously_seen`).
pub fn state_transitions(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &mut AIState,
            &mut AITimers,
            &AIConfig,
            &VisionConfig,
            &mut NavAgent,
            &mut NodeMemory,
            &LastKnownTargetPosition,
            Has<ScanRoutine>,
        ),
        With<Agent>,
    >,
    nodes: Query<(Entity, &Transform), With<PatrolNode>>,
    targets: Query<&Transform, With<Target>>,
    space: Option<Res<SpatialQueryService>>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    let Some(space) = space else {
        logger::log_error("AI: SpatialQueryService not installed, perception disabled");
        return;
    };
    let Ok(target_transform) = targets.single() else {
        logger::log_error(&format!("AI: {}", AIError::MissingTarget));
        return;
    };
    let target_position = target_transform.translation;

    for (
        entity,
        transform,
        mut state,
        mut timers,
        config,
        vision,
        mut nav,
        mut memory,
        last_known,
        scanning,
    ) in agents.iter_mut()
    {
        let visible = target_visible(
            transform.translation,
            *transform.forward(),
            vision,
            space.0.as_ref(),
        );
        timers.accumulate_sight(visible, delta);

        match *state {
            AIState::Roam => {
                if timers.continuously_seen(AIState::Roam, config.alert_threshold) {
                    logger::log_info(&format!("AI: {:?} Roam → Attack (target confirmed)", entity));
                    *state = AIState::Attack;
                }
            }

            AIState::Attack => {
                if !timers.continuously_seen(AIState::Attack, config.lose_threshold) {
                    logger::log_info(&format!(
                        "AI: {:?} Attack → Search (target lost for {:.1}s)",
                        entity, timers.sight_loss
                    ));
                    *state = AIState::Search;
                    nav.set_destination(last_known.0);
                    timers.search_idle = 0.0;
                }
            }

            AIState::Search => {
                if visible {
                    // Мгновенная проверка, без гистерезиса
                    logger::log_info(&format!(
                        "AI: {:?} Search → Attack (target re-sighted)",
                        entity
                    ));
                    *state = AIState::Attack;
                    if scanning {
                        commands.entity(entity).remove::<ScanRoutine>();
                    }
                } else if nav.is_idle(config.search_arrive_distance) {
                    timers.search_idle += delta;
                    if timers.search_idle >= config.search_timeout {
                        logger::log_info(&format!(
                            "AI: {:?} Search → Roam (search timeout)",
                            entity
                        ));
                        *state = AIState::Roam;
                        if scanning {
                            commands.entity(entity).remove::<ScanRoutine>();
                        }
                        let node_set =
                            collect_patrol_nodes(nodes.iter().map(|(e, t)| (e, t.translation)));
                        request_next_patrol_node(
                            entity,
                            transform.translation,
                            &node_set,
                            &mut nav,
                            &mut memory,
                            config,
                            &mut rng.rng,
                        );
                    }
                }
            }

            AIState::Chase => {
                // Выход из Chase: цель вернулась в границу → ищем от последней
                // известной позиции (мгновенная видимость вернёт Attack на
                // следующем тике)
                if horizontal_distance_from_origin(target_position) <= config.map_border {
                    logger::log_info(&format!(
                        "AI: {:?} Chase → Search (target back inside border)",
                        entity
                    ));
                    *state = AIState::Search;
                    nav.set_destination(last_known.0);
                    timers.search_idle = 0.0;
                }
            }
        }
    }
}
