/*
 *   Copyright (c) 2025 twinax-ctl contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Bounded, multi-producer/single-consumer FIFOs for per-terminal command,
//! poll, and response traffic.
//!
//! Backed by [`tokio::sync::mpsc`], which already gives atomic enqueue and
//! dequeue plus a `len()` query — no reason to hand-roll a ring buffer for
//! what a bounded channel already does correctly.

use tokio::sync::mpsc;

/// A bounded FIFO of `T`, cloneable on the producer side.
///
/// `push` rejects rather than blocks when full, matching the "reject and let
/// the caller check depth" contract the link driver relies on to avoid
/// unbounded queuing for a stalled terminal.
pub struct BoundedFifo<T> {
    tx: mpsc::Sender<T>,
    rx: mpsc::Receiver<T>,
}

/// The producer half of a [`BoundedFifo`]. Cheap to clone; each clone counts
/// toward the channel's single capacity budget.
#[derive(Clone)]
pub struct FifoSender<T>(mpsc::Sender<T>);

impl<T> BoundedFifo<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { tx, rx }
    }

    pub fn sender(&self) -> FifoSender<T> {
        FifoSender(self.tx.clone())
    }

    /// Removes and returns the oldest queued item, if any.
    pub async fn pop(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking pop, for consumers (the link driver's blocking I/O
    /// loop) that can't `.await`. Returns `None` on empty as well as on a
    /// closed channel.
    pub fn try_pop(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Current queue depth. Racy against concurrent producers by design —
    /// callers use it for backpressure heuristics, not exact accounting.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Drains every currently-queued item, for the reset path ("an internal
    /// reset... clears all volatile state... and queues").
    pub fn clear(&mut self) {
        while self.try_pop().is_some() {}
    }
}

impl<T> FifoSender<T> {
    /// Enqueues `item`, returning it back on failure (queue full or closed)
    /// rather than silently dropping it.
    pub fn push(&self, item: T) -> Result<(), T> {
        self.0.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(item) => item,
            mpsc::error::TrySendError::Closed(item) => item,
        })
    }

    /// Current queue depth, observed from the producer side — what the pty
    /// bridge polls to decide whether to keep reading from the child.
    pub fn len(&self) -> usize {
        self.0.max_capacity() - self.0.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn push_and_pop_preserve_order() {
        let mut fifo = BoundedFifo::new(4);
        let tx = fifo.sender();
        tx.push(1).unwrap();
        tx.push(2).unwrap();
        tx.push(3).unwrap();
        assert_eq!(fifo.pop().await, Some(1));
        assert_eq!(fifo.pop().await, Some(2));
        assert_eq!(fifo.pop().await, Some(3));
    }

    #[tokio::test]
    async fn push_rejects_when_full() {
        let fifo = BoundedFifo::new(1);
        let tx = fifo.sender();
        tx.push(1).unwrap();
        assert_eq!(tx.push(2), Err(2));
    }

    #[tokio::test]
    async fn len_reflects_queue_depth() {
        let fifo = BoundedFifo::new(2);
        let tx = fifo.sender();
        assert_eq!(fifo.len(), 0);
        tx.push(1).unwrap();
        assert_eq!(fifo.len(), 1);
    }

    #[tokio::test]
    async fn sender_len_matches_receiver_len() {
        let fifo = BoundedFifo::new(4);
        let tx = fifo.sender();
        tx.push(1).unwrap();
        tx.push(2).unwrap();
        assert_eq!(tx.len(), fifo.len());
        assert_eq!(tx.len(), 2);
    }

    #[tokio::test]
    async fn clear_drains_every_queued_item() {
        let mut fifo = BoundedFifo::new(4);
        let tx = fifo.sender();
        tx.push(1).unwrap();
        tx.push(2).unwrap();
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.try_pop(), None);
    }
}
