// ABOUTME: Application-wide event stream shared with panes through their draw context.
// ABOUTME: Each subscriber reads the events posted since its previous read.

use std::collections::HashMap;

use crate::id::PaneId;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The split tree was edited or replaced
    LayoutChanged,
    /// Keyboard focus moved to another pane (or to none)
    KeyboardFocusChanged(Option<PaneId>),
    /// A console pane submitted a line of input
    CommandEntered { pane: PaneId, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

#[derive(Debug, Default)]
pub struct EventStream {
    events: Vec<Event>,
    /// Index into `events` of the next unread event, per subscriber
    cursors: HashMap<SubscriberId, usize>,
    next_subscriber: u32,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.cursors.insert(id, self.events.len());
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.cursors.remove(&id);
        self.compact();
    }

    pub fn post(&mut self, event: Event) {
        if self.cursors.is_empty() {
            return;
        }
        self.events.push(event);
    }

    /// Events posted since this subscriber's previous call
    pub fn get(&mut self, id: SubscriberId) -> Vec<Event> {
        let Some(cursor) = self.cursors.get_mut(&id) else {
            return Vec::new();
        };
        let unread = self.events[*cursor..].to_vec();
        *cursor = self.events.len();
        self.compact();
        unread
    }

    /// Drop events every subscriber has already read
    fn compact(&mut self) {
        let consumed = self.cursors.values().copied().min().unwrap_or(self.events.len());
        if consumed == 0 {
            return;
        }
        self.events.drain(..consumed);
        for cursor in self.cursors.values_mut() {
            *cursor -= consumed;
        }
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_events_posted_after_subscribing() {
        let mut stream = EventStream::new();
        let a = stream.subscribe();
        stream.post(Event::LayoutChanged);
        let b = stream.subscribe();
        stream.post(Event::KeyboardFocusChanged(None));

        assert_eq!(
            stream.get(a),
            vec![Event::LayoutChanged, Event::KeyboardFocusChanged(None)]
        );
        assert_eq!(stream.get(b), vec![Event::KeyboardFocusChanged(None)]);
        assert!(stream.get(a).is_empty());
    }

    #[test]
    fn read_events_are_dropped() {
        let mut stream = EventStream::new();
        let a = stream.subscribe();
        let b = stream.subscribe();
        stream.post(Event::LayoutChanged);
        stream.get(a);
        assert_eq!(stream.pending(), 1);
        stream.get(b);
        assert_eq!(stream.pending(), 0);
    }

    #[test]
    fn posts_without_subscribers_are_discarded() {
        let mut stream = EventStream::new();
        stream.post(Event::LayoutChanged);
        assert_eq!(stream.pending(), 0);
        let a = stream.subscribe();
        assert!(stream.get(a).is_empty());
    }

    #[test]
    fn unsubscribe_releases_backlog() {
        let mut stream = EventStream::new();
        let a = stream.subscribe();
        let b = stream.subscribe();
        stream.post(Event::LayoutChanged);
        stream.get(a);
        stream.unsubscribe(b);
        assert_eq!(stream.pending(), 0);
    }
}
