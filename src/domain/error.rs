// Error taxonomy for a sync cycle
use thiserror::Error;

/// Failure kinds a fetch-decode-reconcile cycle can surface.
///
/// Nothing in the core retries; callers decide based on [`DashboardError::is_transient`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// The feed bytes are not a well-formed GTFS-Realtime message.
    #[error("malformed feed: {0}")]
    Decode(String),

    /// Network failure, timeout, or a server-side error on fetch or store calls.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The store rejected a create or update (auth, validation, bad response).
    #[error("store rejected request: {0}")]
    Store(String),

    /// An update targeted a record the store no longer has.
    #[error("record {0} no longer exists in the store")]
    StaleIdentifier(String),
}

impl DashboardError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
            Self::Store(_) => "store",
            Self::StaleIdentifier(_) => "stale_identifier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_transient() {
        assert!(DashboardError::Transport("timeout".into()).is_transient());
        assert!(!DashboardError::Decode("bad".into()).is_transient());
        assert!(!DashboardError::Store("401".into()).is_transient());
        assert!(!DashboardError::StaleIdentifier("abc".into()).is_transient());
    }

    #[test]
    fn test_stale_identifier_message_names_record() {
        let err = DashboardError::StaleIdentifier("task-42".into());
        assert_eq!(err.to_string(), "record task-42 no longer exists in the store");
        assert_eq!(err.kind(), "stale_identifier");
    }
}
