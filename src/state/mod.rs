//! State module for tracking exploration progress
//!
//! # Components
//!
//! - `ExplorationState`: the complete resumable snapshot of an exploration
//!   (queue, visited fingerprints, graph, bookkeeping), with JSON round-tripping
//! - `PendingEdge`: an edge waiting for its target page to be visited
//! - `VisitOutcome`: how the visit of one dequeued URL ended

mod exploration;
mod visit;

// Re-export main types
pub use exploration::{
    deserialize_exploration_state, serialize_exploration_state, ExplorationState, PendingEdge,
    STATE_VERSION,
};
pub use visit::VisitOutcome;
