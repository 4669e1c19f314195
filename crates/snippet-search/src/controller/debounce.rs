//! Quiet-period scheduling for query evaluation.
//!
//! Every keystroke schedules a new evaluation and, in doing so, invalidates
//! the previously scheduled one. Each schedule is identified by an
//! [`EvaluationTicket`]; only the ticket of the latest schedule is ever
//! accepted, so a timer that fires late can never apply a stale evaluation.

use std::time::{Duration, Instant};

/// Identifies one scheduled evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EvaluationTicket {
    version: u64,
}

impl EvaluationTicket {
    pub fn version(self) -> u64 {
        self.version
    }
}

/// A pending evaluation handed to the host's timer service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledEvaluation {
    pub ticket: EvaluationTicket,
    /// How long the host should wait before calling back with `ticket`.
    pub delay: Duration,
    pub deadline: Instant,
}

/// Tracks the single pending evaluation and the active ticket version.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    active_version: u64,
    pending: Option<ScheduledEvaluation>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            active_version: 0,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedules a new evaluation one quiet period after `now`, replacing any
    /// pending one.
    pub fn schedule(&mut self, now: Instant) -> ScheduledEvaluation {
        self.active_version += 1;
        let scheduled = ScheduledEvaluation {
            ticket: EvaluationTicket {
                version: self.active_version,
            },
            delay: self.quiet_period,
            deadline: now + self.quiet_period,
        };
        self.pending = Some(scheduled);
        scheduled
    }

    /// Drops the pending evaluation, if any. Outstanding tickets become stale.
    ///
    /// Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.active_version += 1;
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }

    /// Returns true if `ticket` belongs to the pending evaluation.
    pub fn is_current(&self, ticket: EvaluationTicket) -> bool {
        self.pending
            .is_some_and(|pending| pending.ticket == ticket && ticket.version == self.active_version)
    }

    /// Claims the pending evaluation for `ticket`.
    ///
    /// Returns false for stale tickets, leaving any newer schedule in place.
    pub fn take(&mut self, ticket: EvaluationTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Claims the pending evaluation if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<EvaluationTicket> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        Some(pending.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn schedule_sets_deadline_one_quiet_period_out() {
        let mut debouncer = Debouncer::new(QUIET);
        let now = Instant::now();
        let scheduled = debouncer.schedule(now);

        assert_eq!(scheduled.deadline, now + QUIET);
        assert_eq!(scheduled.delay, QUIET);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.deadline(), Some(now + QUIET));
    }

    #[test]
    fn rescheduling_invalidates_previous_ticket() {
        let mut debouncer = Debouncer::new(QUIET);
        let now = Instant::now();
        let first = debouncer.schedule(now);
        let second = debouncer.schedule(now + Duration::from_millis(100));

        assert!(!debouncer.take(first.ticket));
        assert!(debouncer.is_pending());
        assert!(debouncer.take(second.ticket));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn ticket_is_claimed_only_once() {
        let mut debouncer = Debouncer::new(QUIET);
        let scheduled = debouncer.schedule(Instant::now());

        assert!(debouncer.take(scheduled.ticket));
        assert!(!debouncer.take(scheduled.ticket));
    }

    #[test]
    fn cancel_makes_tickets_stale() {
        let mut debouncer = Debouncer::new(QUIET);
        let scheduled = debouncer.schedule(Instant::now());

        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert!(!debouncer.take(scheduled.ticket));
    }

    #[test]
    fn take_due_waits_for_deadline() {
        let mut debouncer = Debouncer::new(QUIET);
        let now = Instant::now();
        let scheduled = debouncer.schedule(now);

        assert_eq!(debouncer.take_due(now + Duration::from_millis(299)), None);
        assert_eq!(debouncer.take_due(now + QUIET), Some(scheduled.ticket));
        assert_eq!(debouncer.take_due(now + QUIET), None);
    }

    #[test]
    fn versions_increase_monotonically() {
        let mut debouncer = Debouncer::new(QUIET);
        let now = Instant::now();
        let first = debouncer.schedule(now).ticket.version();
        debouncer.cancel();
        let second = debouncer.schedule(now).ticket.version();
        assert!(second > first);
    }
}
