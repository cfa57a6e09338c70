//! Stale-response guard for data fetches.
//!
//! Every change to the route state starts a new fetch. Responses can arrive
//! out of order, so each fetch carries a [`FetchTicket`] and only the ticket
//! of the latest request may settle; older responses are dropped.

use crate::codec::QueryRecord;
use crate::route::{RouteCodec, RouteSearch};
use std::fmt;
use tracing::debug;

/// Content hash of an encoded route record.
///
/// Two records that encode identically share a key, so re-issuing the same
/// request does not invalidate a fetch already in flight for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey(blake3::Hash);

impl RequestKey {
    /// Hash a query record. Keys and values are length-prefixed so that
    /// no two distinct records collide by concatenation.
    #[must_use]
    pub fn for_record(record: &QueryRecord) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (key, value) in record {
            for part in [key, value] {
                hasher.update(&(part.len() as u64).to_le_bytes());
                hasher.update(part.as_bytes());
            }
        }
        Self(hasher.finalize())
    }

    #[must_use]
    pub fn for_search(codec: &RouteCodec<'_>, search: &RouteSearch) -> Self {
        Self::for_record(&codec.encode(search))
    }

    /// Hex form of the key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

/// Handle returned by [`FetchGuard::begin`] and consumed by
/// [`FetchGuard::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: RequestKey,
    generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub const fn key(&self) -> RequestKey {
        self.key
    }
}

/// Tracks the latest request and discards responses to superseded ones.
#[derive(Debug, Default)]
pub struct FetchGuard {
    latest: Option<FetchTicket>,
    generation: u64,
}

impl FetchGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request for `record` as the latest.
    ///
    /// Beginning the request that is already latest returns the same ticket.
    pub fn begin(&mut self, record: &QueryRecord) -> FetchTicket {
        let key = RequestKey::for_record(record);
        if let Some(latest) = self.latest.filter(|t| t.key == key) {
            return latest;
        }
        self.generation += 1;
        let ticket = FetchTicket {
            key,
            generation: self.generation,
        };
        self.latest = Some(ticket);
        ticket
    }

    #[must_use]
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.as_ref() == Some(ticket)
    }

    /// Pass `value` through if `ticket` is still the latest request.
    pub fn settle<T>(&self, ticket: &FetchTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            return Some(value);
        }
        debug!(
            key = %ticket.key,
            generation = ticket.generation,
            latest = self.generation,
            "discarding stale response"
        );
        None
    }

    /// Forget the latest request; every outstanding ticket becomes stale.
    pub fn cancel(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> QueryRecord {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn latest_ticket_settles_stale_one_does_not() {
        let mut guard = FetchGuard::new();
        let first = guard.begin(&record(&[("archs", "arm64")]));
        let second = guard.begin(&record(&[("archs", "x86")]));

        assert_eq!(guard.settle(&first, "old"), None);
        assert_eq!(guard.settle(&second, "new"), Some("new"));
    }

    #[test]
    fn same_record_reuses_ticket() {
        let mut guard = FetchGuard::new();
        let a = guard.begin(&record(&[("archs", "arm64")]));
        let b = guard.begin(&record(&[("archs", "arm64")]));
        assert_eq!(a, b);
        assert!(guard.is_current(&a));
    }

    #[test]
    fn returning_to_an_earlier_record_is_a_new_request() {
        let mut guard = FetchGuard::new();
        let a = guard.begin(&record(&[("archs", "arm64")]));
        let _b = guard.begin(&record(&[("archs", "x86")]));
        let c = guard.begin(&record(&[("archs", "arm64")]));
        assert_eq!(a.key(), c.key());
        assert_ne!(a, c);
        assert_eq!(guard.settle(&a, 1), None);
        assert_eq!(guard.settle(&c, 1), Some(1));
    }

    #[test]
    fn cancel_invalidates_everything() {
        let mut guard = FetchGuard::new();
        let t = guard.begin(&QueryRecord::new());
        guard.cancel();
        assert_eq!(guard.settle(&t, ()), None);
    }

    #[test]
    fn keys_do_not_collide_by_concatenation() {
        let a = RequestKey::for_record(&record(&[("ab", "c")]));
        let b = RequestKey::for_record(&record(&[("a", "bc")]));
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.to_string().len(), 16);
    }
}
