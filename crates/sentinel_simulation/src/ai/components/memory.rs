//! Память недавних патрульных узлов (anti-repetition queue).

use bevy::prelude::*;
use std::collections::VecDeque;

/// Ограниченная очередь недавно выбранных узлов
///
/// Порядок вставки = порядок давности; при переполнении вытесняется самый
/// старый. Дубликаты не запрещены: узел может вернуться, когда память его
/// состарит. Чётность `len()` задаёт стратегию выбора следующего узла
/// (ближний / дальний).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NodeMemory {
    nodes: VecDeque<Entity>,
    capacity: usize,
}

impl Default for NodeMemory {
    fn default() -> Self {
        Self::new(5)
    }
}

impl NodeMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Запоминает узел; при переполнении вытесняет самый старый
    pub fn remember(&mut self, node: Entity) {
        self.nodes.push_back(node);
        if self.nodes.len() > self.capacity {
            self.nodes.pop_front();
        }
    }

    /// Синхронизирует ёмкость с конфигом; лишние старые записи вытесняются
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.nodes.len() > self.capacity {
            self.nodes.pop_front();
        }
    }

    /// O(len) проверка "узел недавно посещался"
    pub fn contains(&self, node: Entity) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Узлы от старого к новому
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.nodes.iter().copied()
    }
}
