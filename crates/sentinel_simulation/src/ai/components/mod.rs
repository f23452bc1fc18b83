//! AI components

pub mod fsm;
pub mod memory;
pub mod scan;


// Re-export all components
pub use fsm::*;
pub use memory::*;
pub use scan::*;
