//! Data-routing strategies attached to an operator's inbound edge.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_common::types::WorkerId;

/// How records reach an operator from its upstream.
///
/// Every operator (and every sink) has exactly one inbound channel.
/// `Pipeline` is the default when no shuffle precedes the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Channel {
    /// No movement: the operator runs co-located with its upstream data.
    #[default]
    Pipeline,
    /// Repartition records across workers by an encoded key-extraction route.
    Exchange(Bytes),
    /// Replicate every record to every worker, optionally narrowed by a route.
    Broadcast(Option<Bytes>),
    /// Gather all records on one worker.
    Aggregate(WorkerId),
}

impl Channel {
    /// Returns true for [`Channel::Pipeline`].
    #[must_use]
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline)
    }

    /// Returns true if records move between workers.
    #[must_use]
    pub fn is_shuffle(&self) -> bool {
        !self.is_pipeline()
    }

    /// Returns a human-readable name for the channel.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pipeline => "Pipeline",
            Self::Exchange(_) => "Exchange",
            Self::Broadcast(_) => "Broadcast",
            Self::Aggregate(_) => "Aggregate",
        }
    }

    /// Returns the route payload, if the channel carries one.
    #[must_use]
    pub fn route(&self) -> Option<&Bytes> {
        match self {
            Self::Exchange(route) => Some(route),
            Self::Broadcast(route) => route.as_ref(),
            Self::Pipeline | Self::Aggregate(_) => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline => write!(f, "Pipeline"),
            Self::Exchange(route) => write!(f, "Exchange[{}B]", route.len()),
            Self::Broadcast(None) => write!(f, "Broadcast"),
            Self::Broadcast(Some(route)) => write!(f, "Broadcast[{}B]", route.len()),
            Self::Aggregate(worker) => write!(f, "Aggregate({worker})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pipeline() {
        assert!(Channel::default().is_pipeline());
        assert!(!Channel::default().is_shuffle());
    }

    #[test]
    fn test_route() {
        let route = Bytes::from_static(b"id");
        assert_eq!(Channel::Exchange(route.clone()).route(), Some(&route));
        assert_eq!(Channel::Broadcast(None).route(), None);
        assert_eq!(Channel::Aggregate(WorkerId::new(0)).route(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Channel::Exchange(Bytes::from_static(b"abc")).to_string(), "Exchange[3B]");
        assert_eq!(Channel::Aggregate(WorkerId::new(1)).to_string(), "Aggregate(worker#1)");
    }
}
