//! Generation tickets and the `watch` channel they publish into.
//!
//! Every graph-building operation holds a [`Ticket`] while it runs. Tickets
//! are ordered by start time, and the newest started operation decides what
//! the renderer sees:
//!
//! ```text
//! finish(t)   ── newer ticket published ──► discard
//!             ── newer ticket in flight ──► park (newest parked wins)
//!             ── otherwise              ──► publish
//! withdraw(t) ── no newer ticket left    ──► publish the parked result
//! ```
//!
//! A ticket that is dropped without publishing (empty path, store error,
//! cancelled future) withdraws, so it never hides an older finished graph.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::{GraphUpdate, View};
use crate::projection::LocalGraph;

#[derive(Debug, Default)]
struct Ledger {
    issued: u64,
    in_flight: BTreeSet<u64>,
    published: u64,
    parked: Option<GraphUpdate>,
}

impl Ledger {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.in_flight.insert(self.issued);
        self.issued
    }

    fn newer_in_flight(&self, generation: u64) -> bool {
        self.in_flight.range(generation + 1..).next().is_some()
    }

    /// The update to send now, if any.
    fn finish(&mut self, update: GraphUpdate) -> Option<GraphUpdate> {
        let generation = update.generation;
        self.in_flight.remove(&generation);
        if generation <= self.published {
            return None;
        }
        if self.newer_in_flight(generation) {
            if self.parked.as_ref().is_none_or(|parked| parked.generation < generation) {
                self.parked = Some(update);
            }
            return None;
        }
        self.published = generation;
        self.parked = None;
        Some(update)
    }

    fn withdraw(&mut self, generation: u64) -> Option<GraphUpdate> {
        self.in_flight.remove(&generation);
        let parked = self.parked.as_ref()?.generation;
        if parked <= self.published || self.newer_in_flight(parked) {
            return None;
        }
        self.published = parked;
        self.parked.take()
    }
}

pub(crate) struct Publisher {
    ledger: Mutex<Ledger>,
    updates: watch::Sender<GraphUpdate>,
}

impl Publisher {
    pub(crate) fn new() -> Self {
        let initial = GraphUpdate { generation: 0, view: View::Empty, graph: Arc::new(LocalGraph::new()) };
        Self { ledger: Mutex::new(Ledger::default()), updates: watch::Sender::new(initial) }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<GraphUpdate> {
        self.updates.subscribe()
    }

    pub(crate) fn current(&self) -> GraphUpdate {
        self.updates.borrow().clone()
    }

    pub(crate) fn ticket(&self) -> Ticket<'_> {
        let generation = self.ledger.lock().issue();
        Ticket { publisher: self, generation, settled: false }
    }

    // Callers hold the ledger lock so updates leave in ledger order.
    fn send(&self, update: GraphUpdate) {
        self.updates.send_replace(update);
    }
}

/// A running operation's claim on the next published generation.
pub(crate) struct Ticket<'p> {
    publisher: &'p Publisher,
    generation: u64,
    settled: bool,
}

impl Ticket<'_> {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Hand a finished graph over; returns whether it went out immediately.
    pub(crate) fn publish(mut self, view: View, graph: Arc<LocalGraph>) -> bool {
        self.settled = true;
        let update = GraphUpdate { generation: self.generation, view, graph };
        let mut ledger = self.publisher.ledger.lock();
        match ledger.finish(update) {
            Some(update) => {
                self.publisher.send(update);
                true
            }
            None => {
                if ledger.parked.as_ref().is_some_and(|p| p.generation == self.generation) {
                    tracing::debug!(generation = self.generation, "newer operation in flight, result held back");
                } else {
                    tracing::debug!(generation = self.generation, "operation superseded, result discarded");
                }
                false
            }
        }
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut ledger = self.publisher.ledger.lock();
        if let Some(update) = ledger.withdraw(self.generation) {
            tracing::debug!(
                withdrawn = self.generation,
                generation = update.generation,
                "publishing result held back for a withdrawn operation"
            );
            self.publisher.send(update);
        }
    }
}
