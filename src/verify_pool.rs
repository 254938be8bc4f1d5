//! Bounded-concurrency verification pool
//!
//! A counting token pool of exactly `slots` entries paired with a FIFO
//! completion queue. `prime` fills the queue with passing tokens; `take`
//! blocks for one token (a free slot) and yields its outcome; `launch` runs
//! a verification whose result re-enters the queue as a token on completion.
//! A batch ends with `drain`, which consumes every outstanding token and
//! folds outcomes into a single pass/fail. Token conservation is the safety
//! invariant: a non-empty queue after the expected drains means the
//! accounting is broken, and the pool aborts rather than continue.

use std::cell::Cell;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::Scope;

pub struct BoundedVerifierPool {
    slots: usize,
    outstanding: Cell<usize>,
    results_in: Sender<bool>,
    results_out: Receiver<bool>,
}

impl BoundedVerifierPool {
    pub fn new(slots: usize) -> Self {
        assert!(slots > 0, "verifier pool needs at least one slot");
        let (results_in, results_out) = channel();
        BoundedVerifierPool {
            slots,
            outstanding: Cell::new(0),
            results_in,
            results_out,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Fill the queue with one passing token per slot. The pool must be
    /// drained (or fresh) when this is called.
    pub fn prime(&self) {
        assert_eq!(
            self.outstanding.get(),
            0,
            "verifier pool token imbalance: primed while tokens outstanding"
        );
        for _ in 0..self.slots {
            self.results_in
                .send(true)
                .expect("verifier pool queue closed");
        }
        self.outstanding.set(self.slots);
    }

    /// Block until a token is available and consume it, returning its
    /// outcome. Call once before each `launch` or `pass`.
    pub fn take(&self) -> bool {
        let ok = self
            .results_out
            .recv()
            .expect("verifier pool queue closed");
        self.outstanding.set(self.outstanding.get() - 1);
        ok
    }

    /// Run a verification on the slot obtained by `take`; its outcome
    /// returns to the queue as a token when the worker finishes.
    pub fn launch<'scope, F>(&self, scope: &'scope Scope<'scope, '_>, work: F)
    where
        F: FnOnce() -> bool + Send + 'scope,
    {
        let results = self.results_in.clone();
        self.outstanding.set(self.outstanding.get() + 1);
        scope.spawn(move || {
            let _ = results.send(work());
        });
    }

    /// Return a passing token for the slot obtained by `take` without
    /// spawning work. Used for trusted transactions.
    pub fn pass(&self) {
        self.results_in
            .send(true)
            .expect("verifier pool queue closed");
        self.outstanding.set(self.outstanding.get() + 1);
    }

    /// Consume every outstanding token, folding outcomes into one pass/fail.
    /// Blocks until all in-flight verifications finish; there is no
    /// cancellation. Aborts on a token imbalance.
    pub fn drain(&self) -> bool {
        let mut ok = true;
        for _ in 0..self.outstanding.get() {
            if !self
                .results_out
                .recv()
                .expect("verifier pool queue closed")
            {
                ok = false;
            }
        }
        self.outstanding.set(0);
        match self.results_out.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => panic!("verifier pool token imbalance: queue not empty after drain"),
        }
        ok
    }
}
