//! Tagged result of a single fetch attempt.

use crate::error::FetchError;

/// Result of one source fetch for one symbol.
///
/// `Empty` means the source answered definitively but had no data; it is a
/// different fact than `Failed` and the statistics keep them apart. Neither
/// is ever silently collapsed into absence.
#[derive(Debug, Clone)]
pub enum FetchOutcome<T> {
    /// The source returned usable data.
    Success(T),
    /// The source was reachable but had nothing for this symbol.
    Empty,
    /// The fetch failed; the reason is preserved for logging and retry.
    Failed(FetchError),
}

impl<T> FetchOutcome<T> {
    /// True for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// True for `Failed`.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// Consumes the outcome, returning the payload if present.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        match self {
            FetchOutcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Maps the payload type, leaving `Empty` and `Failed` untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(payload) => FetchOutcome::Success(f(payload)),
            FetchOutcome::Empty => FetchOutcome::Empty,
            FetchOutcome::Failed(err) => FetchOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(FetchOutcome::Success(1).is_success());
        assert!(!FetchOutcome::Success(1).is_failed());
        assert!(!FetchOutcome::<i32>::Empty.is_success());
        assert!(FetchOutcome::<i32>::Failed(FetchError::Timeout("t".to_string())).is_failed());
    }

    #[test]
    fn test_into_payload() {
        assert_eq!(FetchOutcome::Success(7).into_payload(), Some(7));
        assert_eq!(FetchOutcome::<i32>::Empty.into_payload(), None);
    }

    #[test]
    fn test_map_preserves_tag() {
        let doubled = FetchOutcome::Success(21).map(|n| n * 2);
        assert_eq!(doubled.into_payload(), Some(42));

        let empty = FetchOutcome::<i32>::Empty.map(|n| n * 2);
        assert!(!empty.is_success());
        assert!(!empty.is_failed());

        let failed = FetchOutcome::<i32>::Failed(FetchError::api(500, "x")).map(|n| n * 2);
        assert!(failed.is_failed());
    }
}
