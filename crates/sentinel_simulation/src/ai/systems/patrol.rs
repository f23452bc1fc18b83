//! Выбор следующего патрульного узла.
//!
//! Стратегия чередуется по чётности памяти: ближний узел ↔ случайный
//! дальний. Чередование не даёт агенту осциллировать между двумя соседними
//! узлами и одновременно тянет его к покрытию карты.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::components::NodeMemory;
use crate::ai::AIConfig;
use crate::components::NavAgent;
use crate::error::AIError;
use crate::logger;

/// Снимает набор узлов в детерминированном порядке (по entity index)
///
/// Порядок итерации Query не гарантирован, а tie-break при равных
/// дистанциях должен быть воспроизводимым.
pub fn collect_patrol_nodes(
    iter: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Vec<(Entity, Vec3)> {
    let mut nodes: Vec<_> = iter.into_iter().collect();
    nodes.sort_by_key(|(entity, _)| entity.index());
    nodes
}

/// Выбирает следующий узел патруля
///
/// - чётная память → ближайший узел, исключая недавние
/// - нечётная → случайный из узлов дальше `far_distance`, исключая недавние;
///   пустой дальний набор откатывается к правилу ближайшего
/// - вся память занята → ближайший без учёта исключений (детерминированный
///   fallback вместо неопределённости)
/// - пустой набор узлов → `AIError::NoPatrolNodes`
pub fn choose_patrol_node(
    position: Vec3,
    nodes: &[(Entity, Vec3)],
    memory: &NodeMemory,
    far_distance: f32,
    rng: &mut impl Rng,
) -> Result<(Entity, Vec3), AIError> {
    if nodes.is_empty() {
        return Err(AIError::NoPatrolNodes);
    }

    let chosen = if memory.len() % 2 == 0 {
        nearest_node(position, nodes, memory)
    } else {
        far_node(position, nodes, memory, far_distance, rng)
    };

    if let Some(node) = chosen {
        return Ok(node);
    }

    // Все узлы в памяти — берём ближайший, игнорируя исключения
    let mut best = nodes[0];
    let mut min_dist = position.distance(best.1);
    for &(entity, node_pos) in &nodes[1..] {
        let dist = position.distance(node_pos);
        if dist < min_dist {
            best = (entity, node_pos);
            min_dist = dist;
        }
    }
    Ok(best)
}

/// Ближайший узел линейным сканом, недавние исключаются
///
/// При равных дистанциях побеждает первый в фиксированном порядке набора
/// (строгое `<` при сравнении).
fn nearest_node(
    position: Vec3,
    nodes: &[(Entity, Vec3)],
    memory: &NodeMemory,
) -> Option<(Entity, Vec3)> {
    let mut closest = None;
    let mut min_dist = f32::INFINITY;
    for &(entity, node_pos) in nodes {
        if memory.contains(entity) {
            continue;
        }
        let dist = position.distance(node_pos);
        if dist < min_dist {
            closest = Some((entity, node_pos));
            min_dist = dist;
        }
    }
    closest
}

/// Случайный узел не ближе `min_distance`, недавние исключаются
///
/// Пустой набор кандидатов → откат к правилу ближайшего.
fn far_node(
    position: Vec3,
    nodes: &[(Entity, Vec3)],
    memory: &NodeMemory,
    min_distance: f32,
    rng: &mut impl Rng,
) -> Option<(Entity, Vec3)> {
    let candidates: Vec<_> = nodes
        .iter()
        .copied()
        .filter(|&(entity, node_pos)| {
            !memory.contains(entity) && position.distance(node_pos) >= min_distance
        })
        .collect();

    if candidates.is_empty() {
        nearest_node(position, nodes, memory)
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Выбор + запрос навигации + запись в память (общий путь Roam/Search/scan)
///
/// Пустой набор узлов логируется как конфигурационная ошибка; назначение
/// при этом не меняется.
pub(crate) fn request_next_patrol_node(
    agent: Entity,
    position: Vec3,
    nodes: &[(Entity, Vec3)],
    nav: &mut NavAgent,
    memory: &mut NodeMemory,
    config: &AIConfig,
    rng: &mut impl Rng,
) {
    match choose_patrol_node(position, nodes, memory, config.far_node_distance, rng) {
        Ok((node, node_pos)) => {
            nav.set_destination(node_pos);
            memory.set_capacity(config.memory_capacity);
            memory.remember(node);
        }
        Err(err) => {
            logger::log_error(&format!("AI: {:?} patrol selection failed: {}", agent, err));
        }
    }
}
