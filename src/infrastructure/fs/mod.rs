//! Filesystem infrastructure

pub mod local;

pub use local::{LocalFs, IGNORE_FILE};
