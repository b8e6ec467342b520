//! Single-slot, thread-safe handoff between the hook callback and a consumer.
//!
//! # Why a mailbox and not a channel? (for beginners)
//!
//! The producer here is an OS hook callback.  Windows calls it on the pump
//! thread and expects it to return within a few hundred milliseconds, or the
//! hook is silently removed.  The callback therefore must never wait on
//! anything except a short-lived lock.
//!
//! The consumer is ordinary application code that wants to write:
//!
//! ```text
//! loop {
//!     let event = mailbox.take_next();   // sleeps until something happens
//!     handle(event);
//! }
//! ```
//!
//! An [`EventMailbox`] holds **at most one** event.  A deposit into a full
//! slot replaces the older event (last write wins), so a consumer that falls
//! behind sees a sparse but correctly ordered subsequence of the input.
//! Consumers that cannot tolerate dropped events must keep up with the input
//! rate; [`EventMailbox::overwritten`] reports how many events were lost.
//!
//! # Synchronisation
//!
//! One `Mutex` guards the whole slot state (`pending` event, shutdown flag).
//! A `Condvar` is notified on every deposit and on shutdown.  Consumers wait
//! with the predicate "event pending OR shutting down", which rules out both
//! lost wake-ups (the predicate is checked under the lock before sleeping)
//! and spurious wake-ups (the predicate is re-checked after waking).

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::event::InputEvent;

/// Everything the lock protects.
#[derive(Debug, Default)]
struct Slot {
    /// `Some` = Full, `None` = Empty.
    pending: Option<InputEvent>,
    shutting_down: bool,
    /// Deposits that replaced an event nobody had taken yet.
    overwritten: u64,
}

/// A one-slot mailbox with blocking retrieval and shutdown.
///
/// Share it between threads with an `Arc`.  Any number of threads may
/// deposit; one consumer call in flight at a time is the expected use.
///
/// # Examples
///
/// ```rust
/// use keybridge_core::{EventMailbox, InputEvent};
///
/// let mailbox = EventMailbox::new();
/// mailbox.deposit(InputEvent::key_down(0x41));
/// mailbox.deposit(InputEvent::key_up(0x41));
///
/// // Last write wins.
/// assert_eq!(mailbox.take_next(), InputEvent::key_up(0x41));
///
/// mailbox.signal_shutdown();
/// assert!(mailbox.take_next().is_sentinel());
/// ```
#[derive(Debug, Default)]
pub struct EventMailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl EventMailbox {
    /// Creates an empty mailbox that is not shutting down.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `event`, replacing any event not yet taken, and wakes one waiter.
    ///
    /// Safe to call from a hook callback: the only wait is for the slot lock,
    /// which every other operation holds for a handful of instructions.
    /// Deposits after shutdown are still stored.
    pub fn deposit(&self, event: InputEvent) {
        {
            let mut slot = self.lock();
            if slot.pending.replace(event).is_some() {
                slot.overwritten = slot.overwritten.wrapping_add(1);
            }
        }
        self.ready.notify_one();
    }

    /// Blocks until an event is available or shutdown has been signalled.
    ///
    /// Returns the pending event (clearing the slot) if there is one.  If the
    /// wait ended only because of shutdown, returns [`InputEvent::SENTINEL`];
    /// once shutdown is signalled this never blocks again.
    pub fn take_next(&self) -> InputEvent {
        let guard = self.lock();
        let mut slot = self
            .ready
            .wait_while(guard, |s| s.pending.is_none() && !s.shutting_down)
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take().unwrap_or(InputEvent::SENTINEL)
    }

    /// Like [`take_next`](Self::take_next) but gives up after `timeout`.
    ///
    /// Returns `None` if neither an event nor shutdown arrived in time.
    pub fn take_next_timeout(&self, timeout: Duration) -> Option<InputEvent> {
        let guard = self.lock();
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |s| {
                s.pending.is_none() && !s.shutting_down
            })
            .unwrap_or_else(PoisonError::into_inner);

        match slot.pending.take() {
            Some(event) => Some(event),
            None if slot.shutting_down => Some(InputEvent::SENTINEL),
            None => None,
        }
    }

    /// Takes the pending event without waiting.  `None` if the slot is empty.
    pub fn try_take(&self) -> Option<InputEvent> {
        self.lock().pending.take()
    }

    /// Marks the mailbox as shutting down and wakes every waiter.  Idempotent.
    pub fn signal_shutdown(&self) {
        self.lock().shutting_down = true;
        self.ready.notify_all();
    }

    /// `true` once [`signal_shutdown`](Self::signal_shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }

    /// Number of deposits that overwrote an event before it was taken.
    pub fn overwritten(&self) -> u64 {
        self.lock().overwritten
    }

    /// Acquires the slot lock.
    ///
    /// No code path can leave `Slot` half-updated, so a poisoned lock (a
    /// panic on another thread while holding it) is recovered rather than
    /// propagated.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Instant;

    use crate::event::Action;

    /// Upper bound for "returns promptly" assertions.
    const PROMPT: Duration = Duration::from_secs(2);

    #[test]
    fn test_take_next_returns_deposited_event() {
        // Arrange
        let mailbox = EventMailbox::new();

        // Act
        mailbox.deposit(InputEvent::key_down(0x41));

        // Assert
        assert_eq!(mailbox.take_next(), InputEvent::key_down(0x41));
    }

    #[test]
    fn test_last_write_wins_without_intervening_take() {
        // Arrange
        let mailbox = EventMailbox::new();

        // Act
        for code in 1..=10 {
            mailbox.deposit(InputEvent::key_down(code));
        }

        // Assert
        assert_eq!(mailbox.take_next(), InputEvent::key_down(10));
        assert_eq!(mailbox.overwritten(), 9);
        assert_eq!(mailbox.try_take(), None, "slot must be empty after take");
    }

    #[test]
    fn test_take_clears_slot() {
        let mailbox = EventMailbox::new();
        mailbox.deposit(InputEvent::mouse(Action::RightMouseUp));

        assert_eq!(mailbox.try_take(), Some(InputEvent::mouse(Action::RightMouseUp)));
        assert_eq!(mailbox.try_take(), None);
        assert_eq!(mailbox.overwritten(), 0);
    }

    #[test]
    fn test_take_next_timeout_returns_none_when_idle() {
        let mailbox = EventMailbox::new();
        assert_eq!(mailbox.take_next_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_take_next_timeout_returns_pending_event() {
        let mailbox = EventMailbox::new();
        mailbox.deposit(InputEvent::key_up(0x20));
        assert_eq!(
            mailbox.take_next_timeout(Duration::from_millis(20)),
            Some(InputEvent::key_up(0x20))
        );
    }

    #[test]
    fn test_take_next_timeout_returns_sentinel_after_shutdown() {
        let mailbox = EventMailbox::new();
        mailbox.signal_shutdown();
        assert_eq!(
            mailbox.take_next_timeout(Duration::from_secs(60)),
            Some(InputEvent::SENTINEL)
        );
    }

    #[test]
    fn test_blocked_consumer_receives_later_deposit() {
        // Arrange
        let mailbox = Arc::new(EventMailbox::new());
        let (tx, rx) = mpsc::channel();
        let consumer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || tx.send(mailbox.take_next()).unwrap())
        };

        // Act – give the consumer a moment to block first.
        thread::sleep(Duration::from_millis(50));
        mailbox.deposit(InputEvent::key_down(0x1B));

        // Assert
        let got = rx.recv_timeout(PROMPT).expect("consumer must wake on deposit");
        assert_eq!(got, InputEvent::key_down(0x1B));
        consumer.join().unwrap();
    }

    #[test]
    fn test_shutdown_releases_blocked_consumer_with_sentinel() {
        // Arrange
        let mailbox = Arc::new(EventMailbox::new());
        let (tx, rx) = mpsc::channel();
        let consumer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || tx.send(mailbox.take_next()).unwrap())
        };
        thread::sleep(Duration::from_millis(50));

        // Act
        mailbox.signal_shutdown();

        // Assert
        let got = rx.recv_timeout(PROMPT).expect("consumer must be released");
        assert!(got.is_sentinel());
        consumer.join().unwrap();
    }

    #[test]
    fn test_shutdown_releases_every_waiter() {
        let mailbox = Arc::new(EventMailbox::new());
        let (tx, rx) = mpsc::channel();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let mailbox = Arc::clone(&mailbox);
                let tx = tx.clone();
                thread::spawn(move || tx.send(mailbox.take_next()).unwrap())
            })
            .collect();
        thread::sleep(Duration::from_millis(50));

        mailbox.signal_shutdown();

        for _ in 0..4 {
            let got = rx.recv_timeout(PROMPT).expect("every waiter must be released");
            assert!(got.is_sentinel());
        }
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn test_take_next_after_shutdown_does_not_block() {
        // Arrange
        let mailbox = EventMailbox::new();
        mailbox.signal_shutdown();

        // Act
        let start = Instant::now();
        let first = mailbox.take_next();
        let second = mailbox.take_next();

        // Assert
        assert!(first.is_sentinel());
        assert!(second.is_sentinel());
        assert!(start.elapsed() < PROMPT);
    }

    #[test]
    fn test_pending_event_still_delivered_after_shutdown() {
        let mailbox = EventMailbox::new();
        mailbox.deposit(InputEvent::key_down(0x70));
        mailbox.signal_shutdown();

        assert_eq!(mailbox.take_next(), InputEvent::key_down(0x70));
        assert!(mailbox.take_next().is_sentinel());
    }

    #[test]
    fn test_signal_shutdown_is_idempotent() {
        let mailbox = EventMailbox::new();
        assert!(!mailbox.is_shutting_down());

        mailbox.signal_shutdown();
        mailbox.signal_shutdown();

        assert!(mailbox.is_shutting_down());
        assert!(mailbox.take_next().is_sentinel());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        // Arrange – poison the mutex by panicking while holding it.
        let mailbox = Arc::new(EventMailbox::new());
        let poisoner = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                let _guard = mailbox.slot.lock().unwrap();
                panic!("poison the slot lock");
            })
        };
        assert!(poisoner.join().is_err());

        // Act
        mailbox.deposit(InputEvent::key_down(0x42));

        // Assert
        assert_eq!(mailbox.take_next(), InputEvent::key_down(0x42));
    }
}
