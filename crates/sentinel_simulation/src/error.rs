//! Конфигурационные ошибки decision core.

use thiserror::Error;

/// Ошибки конфигурации мира, при которых агент не может принимать решения.
///
/// Системы не паникуют: ошибка логируется, тик пропускается (fail fast
/// на уровне лога вместо движения к неопределённой точке).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AIError {
    /// Набор патрульных узлов пуст — Roam не может выбрать назначение
    #[error("patrol node set is empty")]
    NoPatrolNodes,

    /// В мире не зарегистрирован ровно один Target
    #[error("no target entity registered")]
    MissingTarget,
}
