//! Console notifications.
//!
//! Events are delivered over `std::sync::mpsc` channels after the state
//! change they describe has completed. Receivers that have been dropped are
//! pruned on the next send.

use std::sync::mpsc::{Receiver, Sender, channel};

/// Something a front end may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The console was reset (also sent after a cartridge is inserted).
    Reset,
    /// A vertical sync completed a frame; the frame buffer is ready.
    Frame,
    /// A step or resume finished, or execution stopped on an error.
    Break,
    /// Free-running execution started.
    Resume,
}

/// Subscriber list.
#[derive(Debug, Default)]
pub struct Events {
    subscribers: Vec<Sender<Event>>,
}

impl Events {
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    pub fn emit(&mut self, event: Event) {
        self.subscribers.retain(|s| s.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_events() {
        let mut events = Events::default();
        let a = events.subscribe();
        let b = events.subscribe();
        events.emit(Event::Reset);
        assert_eq!(a.try_recv(), Ok(Event::Reset));
        assert_eq!(b.try_recv(), Ok(Event::Reset));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut events = Events::default();
        let kept = events.subscribe();
        drop(events.subscribe());
        events.emit(Event::Frame);
        assert_eq!(events.subscribers.len(), 1);
        assert_eq!(kept.try_recv(), Ok(Event::Frame));
    }
}
