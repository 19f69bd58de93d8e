//! Simulation notifications
//!
//! Systems push `SimEvent`s into a per-tick buffer. Once the tick has been
//! fully applied the driver publishes them through the `EventBus` to every
//! subscribed listener channel, in emission order.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::game::state::ActorId;

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEndReason {
    /// One or zero actors left standing
    Knockout,
    /// Final countdown ran out
    Timeout,
}

/// Fire-once notifications for UI/FX collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Pre-round countdown shows a new whole number
    CountdownTick { value: u32 },
    /// A round began
    RoundStarted { round: u32, modifier: Option<String> },
    /// The round's modifier, for a banner
    ModifierAnnounced { name: String, description: String },
    /// Chaos field switched on
    EscalationTriggered { round: u32 },
    /// Sudden death latched
    SuddenDeathStarted { round: u32 },
    /// Circular finale switched on
    CentrifugeActivated { round: u32, radius: f64 },
    /// Final countdown shows a new whole number of seconds
    FinalCountdownTick { seconds_left: u32 },
    /// Two actors collided
    ActorsCollided { a: ActorId, b: ActorId, impact: f64 },
    /// An actor was knocked out
    ActorEliminated { actor: ActorId, round: u32 },
    /// A round finished
    RoundEnded {
        winner: Option<ActorId>,
        round: u32,
        reason: RoundEndReason,
    },
    /// Someone reached the required win count
    MatchEnded { winner: ActorId },
}

/// Fan-out of published events to listener channels
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SimEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the receiver unsubscribes it.
    pub fn subscribe(&mut self) -> Receiver<SimEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `events` to every live listener, pruning closed ones
    pub fn publish(&mut self, events: &[SimEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers.retain(|subscriber| {
            events.iter().all(|event| subscriber.send(event.clone()).is_ok())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(&[
            SimEvent::CountdownTick { value: 3 },
            SimEvent::RoundStarted { round: 1, modifier: None },
        ]);

        for rx in [&a, &b] {
            let got: Vec<_> = rx.try_iter().collect();
            assert_eq!(
                got,
                vec![
                    SimEvent::CountdownTick { value: 3 },
                    SimEvent::RoundStarted { round: 1, modifier: None },
                ]
            );
        }
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        let dropped = bus.subscribe();
        drop(dropped);

        bus.publish(&[SimEvent::MatchEnded { winner: ActorId(1) }]);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_iter().count(), 1);
    }

    #[test]
    fn test_empty_publish_is_noop() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        bus.publish(&[]);
        assert!(rx.is_empty());
    }
}
