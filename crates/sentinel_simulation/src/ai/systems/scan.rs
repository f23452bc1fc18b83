//! Драйвер процедуры осмотра: один шаг sub-FSM за тик.

use bevy::prelude::*;

use crate::ai::components::{AIConfig, AIState, NodeMemory, ScanPhase, ScanRoutine};
use crate::components::NavAgent;
use crate::logger;
use crate::DeterministicRng;

use super::patrol::{collect_patrol_nodes, request_next_patrol_node};

/// Система: продвижение активных осмотров
///
/// Turning: slerp к target_yaw с фактором `delta × scan_turn_rate`,
/// окно `scan_turn_duration`. Settling: пауза `scan_settle_duration` без
/// изменения взгляда. После последнего смещения — переход в Roam и запрос
/// следующего узла патруля.
///
/// Ориентир шага считается от ТЕКУЩЕГО yaw на момент старта шага (slerp
/// предыдущего шага не обязан дойти до цели, дрейф — часть контракта).
pub fn advance_scan_routines(
    mut agents: Query<(
        Entity,
        &mut Transform,
        &mut ScanRoutine,
        &mut AIState,
        &AIConfig,
        &mut NavAgent,
        &mut NodeMemory,
    )>,
    nodes: Query<(Entity, &Transform), (With<crate::components::PatrolNode>, Without<ScanRoutine>)>,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut scan, mut state, config, mut nav, mut memory) in
        agents.iter_mut()
    {
        // Страховка: состояние сменилось в обход отмены — снимаем осмотр
        if *state != AIState::Search {
            commands.entity(entity).remove::<ScanRoutine>();
            continue;
        }

        match scan.phase {
            ScanPhase::Turning => {
                let goal = Quat::from_rotation_y(scan.target_yaw);
                let factor = (delta * config.scan_turn_rate).min(1.0);
                transform.rotation = transform.rotation.slerp(goal, factor);

                scan.elapsed += delta;
                if scan.elapsed >= config.scan_turn_duration {
                    scan.phase = ScanPhase::Settling;
                    scan.elapsed = 0.0;
                }
            }

            ScanPhase::Settling => {
                scan.elapsed += delta;
                if scan.elapsed < config.scan_settle_duration {
                    continue;
                }

                scan.step += 1;
                if scan.step >= config.scan_offsets.len() {
                    // Осмотр завершён: возврат к патрулю
                    logger::log_info(&format!(
                        "AI: {:?} search sweep complete → Roam",
                        entity
                    ));
                    *state = AIState::Roam;
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
                    commands.entity(entity).remove::<ScanRoutine>();
                } else {
                    let yaw = transform.rotation.to_euler(EulerRot::YXZ).0;
                    scan.target_yaw = yaw + config.scan_offsets[scan.step].to_radians();
                    scan.phase = ScanPhase::Turning;
                    scan.elapsed = 0.0;
                }
            }
        }
    }
}
