use std::sync::atomic::{AtomicU64, Ordering};

/// Generation counter for last-issued-wins request ordering
///
/// Each request takes a ticket when it is issued. When its response arrives
/// it may only be applied if no newer ticket has been issued since.
#[derive(Debug, Default)]
pub(crate) struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Latest ticket issued, without issuing a new one
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_newest_ticket_is_current() {
        let gate = RequestGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
        assert_eq!(gate.current(), second);
    }
}
