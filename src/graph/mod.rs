//! Page/action graph
//!
//! This module holds the value types produced by an exploration:
//! - `AppNode`: one distinct page state
//! - `AppEdge`: one action taken from a node
//! - `AppGraph`: the append-only graph plus run metadata, with lookups,
//!   simple-path enumeration and JSON round-tripping

mod model;
mod paths;

pub use model::{ActionType, AppEdge, AppGraph, AppNode, GraphMetadata};
