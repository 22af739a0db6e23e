//! Bounded blocking work queue between the ingestion worker and the compute
//! pool.
//!
//! The bounded capacity is the engine's sole back-pressure mechanism: a full
//! queue stalls ingestion (bounded wait, then drop); an empty queue idles
//! compute workers. Shutdown is signalled by one sentinel per worker.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use thiserror::Error;

use crate::document::Document;

/// Item carried on the work queue.
#[derive(Debug)]
pub enum WorkItem {
    Doc(Box<Document>),
    /// Shutdown sentinel; each compute worker exits on receiving one.
    Shutdown,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue capacity must be at least 1")]
    InvalidCapacity,
    #[error("queue full after bounded wait")]
    Full(WorkItem),
    #[error("queue disconnected")]
    Disconnected,
}

/// Bounded multi-consumer work queue.
#[derive(Clone)]
pub struct WorkQueue {
    tx: Sender<WorkItem>,
    rx: Receiver<WorkItem>,
}

impl WorkQueue {
    pub fn bounded(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        let (tx, rx) = bounded(capacity);
        Ok(Self { tx, rx })
    }

    /// Unbounded blocking push; used for shutdown sentinels, which must be
    /// delivered.
    pub fn push(&self, item: WorkItem) -> Result<(), QueueError> {
        self.tx.send(item).map_err(|_| QueueError::Disconnected)
    }

    /// Blocking push with a bounded wait. On timeout the item is handed back
    /// so the caller can account for the drop.
    pub fn push_timeout(&self, item: WorkItem, timeout: Duration) -> Result<(), QueueError> {
        match self.tx.send_timeout(item, timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(item)) => Err(QueueError::Full(item)),
            Err(SendTimeoutError::Disconnected(_)) => Err(QueueError::Disconnected),
        }
    }

    /// Blocking pop with a bounded wait; `None` means the wait elapsed.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<WorkItem> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> WorkItem {
        WorkItem::Doc(Box::new(Document::new(name, "body")))
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            WorkQueue::bounded(0),
            Err(QueueError::InvalidCapacity)
        ));
    }

    #[test]
    fn push_pop_roundtrip() {
        let queue = WorkQueue::bounded(2).unwrap();
        queue
            .push_timeout(doc("a.txt"), Duration::from_millis(10))
            .unwrap();
        match queue.pop_timeout(Duration::from_millis(10)) {
            Some(WorkItem::Doc(d)) => assert_eq!(d.source, "a.txt"),
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn full_queue_times_out_and_returns_item() {
        let queue = WorkQueue::bounded(1).unwrap();
        queue
            .push_timeout(doc("a.txt"), Duration::from_millis(10))
            .unwrap();
        match queue.push_timeout(doc("b.txt"), Duration::from_millis(10)) {
            Err(QueueError::Full(WorkItem::Doc(d))) => assert_eq!(d.source, "b.txt"),
            other => panic!("expected Full, got {other:?}"),
        }
    }

    #[test]
    fn empty_pop_times_out() {
        let queue = WorkQueue::bounded(1).unwrap();
        assert!(queue.pop_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn sentinels_drain_in_order_after_work() {
        let queue = WorkQueue::bounded(4).unwrap();
        queue
            .push_timeout(doc("a.txt"), Duration::from_millis(10))
            .unwrap();
        queue
            .push_timeout(WorkItem::Shutdown, Duration::from_millis(10))
            .unwrap();
        assert!(matches!(
            queue.pop_timeout(Duration::from_millis(10)),
            Some(WorkItem::Doc(_))
        ));
        assert!(matches!(
            queue.pop_timeout(Duration::from_millis(10)),
            Some(WorkItem::Shutdown)
        ));
    }
}
