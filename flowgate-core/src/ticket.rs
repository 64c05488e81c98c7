// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Identity of an admitted call. Only the most recently issued ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket source.
#[derive(Debug, Default)]
pub struct TicketCounter {
    latest: u64,
}

impl TicketCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, making every earlier one stale.
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Makes every issued ticket stale without issuing a new one.
    pub fn retire(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tickets_increase() {
        let mut counter = TicketCounter::new();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut counter = TicketCounter::new();
        let first = counter.issue();
        let second = counter.issue();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn retire_invalidates_latest() {
        let mut counter = TicketCounter::new();
        let ticket = counter.issue();
        counter.retire();
        assert!(!counter.is_current(ticket));
        let next = counter.issue();
        assert!(counter.is_current(next));
    }
}
