//! Publish/subscribe fan-out for state snapshots.

use std::sync::mpsc::{channel, Receiver, Sender};

use tracing::trace;

/// Sends every published value to all live subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug)]
pub struct Broadcaster<T> {
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone> Broadcaster<T> {
    /// Creates a broadcaster with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers `value` to every subscriber.
    pub fn publish(&mut self, value: &T) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            trace!(pruned, "dropped closed subscribers");
        }
    }

    /// Number of live subscribers as of the last publish.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out() {
        let mut b = Broadcaster::new();
        let a = b.subscribe();
        let c = b.subscribe();
        b.publish(&7u64);
        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(c.try_recv().unwrap(), 7);
    }

    #[test]
    fn test_prunes_dropped() {
        let mut b = Broadcaster::new();
        let keep = b.subscribe();
        drop(b.subscribe());
        assert_eq!(b.len(), 2);
        b.publish(&1u8);
        assert_eq!(b.len(), 1);
        assert_eq!(keep.recv().unwrap(), 1);
    }
}
