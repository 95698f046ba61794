//! Identifier newtypes.
//!
//! All identifiers are plain integers on the wire; the newtypes only keep
//! them from being mixed up inside the lowering code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl JobId {
    /// Creates a new job identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Index of a worker process taking part in a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// Creates a new worker identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

/// Small integer standing in for a tag/alias name inside encoded payloads.
///
/// Tag ids are dense and allocated in first-use order, starting at zero,
/// for the duration of one lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(pub u32);

impl TagId {
    /// Creates a new tag identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(JobId::new(7).to_string(), "job#7");
        assert_eq!(WorkerId::new(2).to_string(), "worker#2");
        assert_eq!(TagId::new(0).to_string(), "@0");
    }

    #[test]
    fn test_ordering() {
        assert!(TagId::new(1) < TagId::new(2));
        assert_eq!(WorkerId::default(), WorkerId::new(0));
    }
}
