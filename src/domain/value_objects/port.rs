//! Exposed Port Declaration Value Object
//!
//! Advisory metadata attached to an image: the TCP port the entry process is
//! expected to bind. Declaring it binds nothing; reconciliation against the
//! actually-bound port is the probe's job.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Advisory TCP port declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortDeclaration(u16);

impl PortDeclaration {
    pub fn new(port: u16) -> Self {
        Self(port)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
