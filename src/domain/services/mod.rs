//! Domain services - pure logic, no I/O

pub mod graph;

pub use graph::{artifact, BuildGraph, StepId, StepNode};
