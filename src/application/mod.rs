//! Application layer - use cases coordinating domain and infrastructure

pub mod build;
pub mod probe;
pub mod run;

pub use build::{BuildReport, BuildUseCase, LayerOutcome};
pub use probe::{probe_image, reconcile, ProbeReport};
pub use run::{
    ContainerLifecycle, ContainerState, PreparedContainer, RunOutcome, RunUseCase,
    INTERRUPT_EXIT_CODE,
};
