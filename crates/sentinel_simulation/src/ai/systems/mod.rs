//! AI systems (strategic layer logic)

pub mod fsm;
pub mod patrol;
pub mod scan;
pub mod telemetry;


// Re-export all systems
pub use fsm::*;
pub use patrol::*;
pub use scan::*;
pub use telemetry::*;
