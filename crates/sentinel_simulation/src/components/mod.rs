//! ECS Components для сущностей мира
//!
//! Организация по доменам:
//! - agent: маркеры Agent / Target / PatrolNode
//! - navigation: зеркало внешнего навигационного исполнителя (NavAgent)
//!
//! AI-специфичные компоненты (состояние FSM, таймеры, память узлов,
//! процедура осмотра) живут в `crate::ai::components`.

pub mod agent;
pub mod navigation;

// Re-exports для удобного импорта
pub use agent::*;
pub use navigation::*;
