//! Simulated gossip: delayed delivery of transactions between processes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tangle_env::{NodeId, ProcessId, RandomSource};

/// A scheduled observation: `receiver` learns `node` at `deliver_time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryEvent {
    pub deliver_time: f64,
    pub receiver: ProcessId,
    pub node: NodeId,
}

/// Heap entry ordered by earliest delivery time, then by scheduling order.
#[derive(Debug)]
struct PendingDelivery {
    event: DeliveryEvent,
    seq: u64,
}

impl PartialEq for PendingDelivery {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingDelivery {}

impl PartialOrd for PendingDelivery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingDelivery {
    // Reversed so the max-heap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .deliver_time
            .total_cmp(&self.event.deliver_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered queue of pending deliveries.
///
/// Events with equal delivery time come out in the order they were
/// scheduled, so a seed fully determines delivery order.
#[derive(Debug)]
pub struct DeliveryQueue {
    pending: BinaryHeap<PendingDelivery>,

    /// Next insertion sequence number
    next_seq: u64,

    /// Minimum gossip delay
    min_delay: f64,

    /// Maximum gossip delay
    max_delay: f64,

    /// Total events scheduled by broadcasts (for metrics)
    messages_sent: u64,
}

impl DeliveryQueue {
    /// Creates an empty queue with delays drawn from `[min_delay, max_delay]`.
    pub fn new(min_delay: f64, max_delay: f64) -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_seq: 0,
            min_delay,
            max_delay,
            messages_sent: 0,
        }
    }

    /// Adds an event to the queue.
    pub fn schedule(&mut self, event: DeliveryEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingDelivery { event, seq });
    }

    /// Removes and returns every event due at `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<DeliveryEvent> {
        let mut ready = Vec::new();
        while let Some(next) = self.pending.peek() {
            if next.event.deliver_time > now {
                break;
            }
            if let Some(entry) = self.pending.pop() {
                ready.push(entry.event);
            }
        }
        ready
    }

    /// Schedules `node` for every process except `sender`.
    ///
    /// Receivers are visited in ascending id order and each gets an
    /// independently drawn delay. Returns the number of events scheduled.
    pub fn broadcast<R: RandomSource + ?Sized>(
        &mut self,
        node: NodeId,
        sender: ProcessId,
        num_processes: usize,
        now: f64,
        rng: &mut R,
    ) -> usize {
        let mut sent = 0;
        for receiver in (0..num_processes).map(ProcessId) {
            if receiver == sender {
                continue;
            }
            let delay = rng.uniform_real(self.min_delay, self.max_delay);
            self.schedule(DeliveryEvent {
                deliver_time: now + delay,
                receiver,
                node,
            });
            sent += 1;
        }
        self.messages_sent += sent as u64;
        sent
    }

    /// Returns the total number of messages sent.
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Events still in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangle_env::SeededRng;

    fn event(time: f64, receiver: usize, node: usize) -> DeliveryEvent {
        DeliveryEvent {
            deliver_time: time,
            receiver: ProcessId(receiver),
            node: NodeId(node),
        }
    }

    #[test]
    fn test_drain_due_returns_only_due_events_in_order() {
        let mut queue = DeliveryQueue::new(1.0, 5.0);
        for (t, n) in [(3.5, 1), (1.0, 2), (7.0, 3), (2.0, 4), (3.0, 5)] {
            queue.schedule(event(t, 0, n));
        }

        let due = queue.drain_due(3.0);
        let times: Vec<f64> = due.iter().map(|e| e.deliver_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(queue.len(), 2);

        // Nothing is returned twice
        assert!(queue.drain_due(3.0).is_empty());

        let rest: Vec<usize> = queue.drain_due(10.0).iter().map(|e| e.node.index()).collect();
        assert_eq!(rest, vec![1, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_times_keep_scheduling_order() {
        let mut queue = DeliveryQueue::new(1.0, 1.0);
        for node in 0..20 {
            queue.schedule(event(4.0, node % 3, node));
        }
        queue.schedule(event(2.0, 0, 99));

        let nodes: Vec<usize> = queue.drain_due(4.0).iter().map(|e| e.node.index()).collect();
        let mut expected = vec![99];
        expected.extend(0..20);
        assert_eq!(nodes, expected);
    }

    #[test]
    fn test_broadcast_skips_sender() {
        let mut queue = DeliveryQueue::new(1.0, 5.0);
        let mut rng = SeededRng::new(42);

        let sent = queue.broadcast(NodeId(1), ProcessId(2), 4, 10.0, &mut rng);
        assert_eq!(sent, 3);
        assert_eq!(queue.messages_sent(), 3);

        let events = queue.drain_due(100.0);
        let mut receivers: Vec<usize> = events.iter().map(|e| e.receiver.index()).collect();
        receivers.sort();
        assert_eq!(receivers, vec![0, 1, 3]);

        for e in events {
            assert!(e.deliver_time >= 11.0 && e.deliver_time <= 15.0);
        }
    }

    #[test]
    fn test_broadcast_single_process_sends_nothing() {
        let mut queue = DeliveryQueue::new(1.0, 5.0);
        let mut rng = SeededRng::new(1);

        assert_eq!(queue.broadcast(NodeId(1), ProcessId(0), 1, 0.0, &mut rng), 0);
        assert_eq!(queue.messages_sent(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let mut queue = DeliveryQueue::new(0.0, 0.0);
        let mut rng = SeededRng::new(1);

        queue.broadcast(NodeId(5), ProcessId(0), 3, 2.0, &mut rng);
        assert_eq!(queue.drain_due(2.0).len(), 2);
    }
}
