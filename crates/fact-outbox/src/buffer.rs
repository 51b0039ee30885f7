//! Dispatch buffer: owns the pending queue and the join point.

use crate::{Fact, FactSender, RetriesExhausted};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info};

/// Terminal per-fact result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactOutcome {
    /// The fact reached the server.
    Delivered {
        /// Value of the delivered fact.
        value: i64,
    },
    /// Every attempt failed.
    Failed {
        /// Value of the failed fact.
        value: i64,
        /// The exhausted-retries error.
        error: RetriesExhausted,
    },
}

impl FactOutcome {
    /// Whether this outcome is a successful delivery.
    pub fn is_delivered(&self) -> bool {
        matches!(self, FactOutcome::Delivered { .. })
    }

    /// Value of the fact this outcome belongs to.
    pub fn value(&self) -> i64 {
        match self {
            FactOutcome::Delivered { value } => *value,
            FactOutcome::Failed { value, .. } => *value,
        }
    }
}

/// Buffer of pending facts with one delivery task per fact.
///
/// `add_facts` spawns one concurrent task per record, so concurrency equals
/// batch size; suitable for small batches. A task's failure is logged,
/// recorded as its outcome, and otherwise swallowed: [`join`](Self::join)
/// completing means "all attempts finished", not "all deliveries succeeded".
pub struct FactBuffer {
    /// Pending fact queue; append-only for the lifetime of a batch.
    queue: Mutex<VecDeque<Fact>>,
    /// Retry driver shared by all delivery tasks.
    sender: Arc<FactSender>,
    /// Tasks launched but not yet terminal.
    in_flight: AtomicUsize,
    /// Woken when `in_flight` drains to zero.
    drained: Notify,
    /// Terminal outcomes, one per dispatched fact.
    outcomes: std::sync::Mutex<Vec<FactOutcome>>,
}

impl FactBuffer {
    /// Create an empty buffer around a sender.
    pub fn new(sender: FactSender) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            sender: Arc::new(sender),
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
            outcomes: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a batch and launch one delivery task per fact.
    ///
    /// The in-flight count covers the whole batch before any task is
    /// spawned, so a subsequent [`join`](Self::join) cannot return before
    /// every task of this batch is terminal.
    pub async fn add_facts(self: &Arc<Self>, facts: Vec<Fact>) {
        {
            let mut queue = self.queue.lock().await;
            queue.extend(facts.iter().cloned());
        }

        self.in_flight.fetch_add(facts.len(), Ordering::SeqCst);

        debug!(count = facts.len(), "Enqueued facts");

        for fact in facts {
            let buffer = Arc::clone(self);
            tokio::spawn(async move {
                buffer.process(fact).await;
            });
        }
    }

    /// Deliver one fact and record its terminal outcome.
    async fn process(&self, fact: Fact) {
        let value = fact.value;

        let outcome = match self.sender.send(&fact).await {
            Ok(()) => {
                info!(value = value, "Fact delivered");
                FactOutcome::Delivered { value }
            }
            Err(error) => {
                error!(value = value, error = %error, "Fact delivery failed");
                FactOutcome::Failed { value, error }
            }
        };

        // Outcome must be visible before the count drops, so a caller
        // returning from join() observes every outcome.
        self.outcomes.lock().expect("lock poisoned").push(outcome);

        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Block until every task launched so far is terminal.
    ///
    /// Facts added after `join` was called are not covered by that call;
    /// the canonical usage is a single `add_facts` followed by `join`.
    pub async fn join(&self) {
        loop {
            let drained = self.drained.notified();
            tokio::pin!(drained);
            // Register before checking, so a decrement-to-zero between the
            // check and the await still wakes us.
            drained.as_mut().enable();

            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }

            drained.await;
        }
    }

    /// Total number of facts ever enqueued.
    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Number of tasks still in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the terminal outcomes recorded so far.
    pub fn outcomes(&self) -> Vec<FactOutcome> {
        self.outcomes.lock().expect("lock poisoned").clone()
    }
}
