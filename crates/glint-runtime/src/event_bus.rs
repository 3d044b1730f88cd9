//! Event queue between the host and the director

use crate::event::PageEvent;
use std::collections::VecDeque;

/// Page events waiting for the next frame.
///
/// Back-to-back pointer or touch moves collapse into the latest one; only
/// the final position of a frame matters to the effects.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<PageEvent>,
    coalesced: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PageEvent) {
        let replaces_last = matches!(
            (self.queue.back(), &event),
            (Some(PageEvent::PointerMove { .. }), PageEvent::PointerMove { .. })
                | (Some(PageEvent::TouchMove { .. }), PageEvent::TouchMove { .. })
        );
        if replaces_last {
            self.queue.pop_back();
            self.coalesced += 1;
        }
        self.queue.push_back(event);
    }

    /// Everything queued, oldest first
    pub fn drain(&mut self) -> Vec<PageEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Moves dropped in favour of a later one since the bus was created
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::ElementId;

    #[test]
    fn drains_in_arrival_order() {
        let mut bus = EventBus::new();
        bus.push(PageEvent::Load);
        bus.push(PageEvent::Scroll { offset: 40.0 });
        bus.push(PageEvent::Click {
            element: ElementId::from_raw(7),
        });

        assert_eq!(bus.len(), 3);
        let events = bus.drain();
        assert_eq!(events[0], PageEvent::Load);
        assert_eq!(events[2].name(), "click");
        assert!(bus.is_empty());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn consecutive_moves_keep_the_latest() {
        let mut bus = EventBus::new();
        bus.push(PageEvent::PointerMove { x: 1.0, y: 1.0 });
        bus.push(PageEvent::PointerMove { x: 2.0, y: 2.0 });
        bus.push(PageEvent::PointerMove { x: 3.0, y: 3.0 });
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.coalesced(), 2);
        assert_eq!(bus.drain(), vec![PageEvent::PointerMove { x: 3.0, y: 3.0 }]);
    }

    #[test]
    fn other_events_break_a_run_of_moves() {
        let mut bus = EventBus::new();
        bus.push(PageEvent::PointerMove { x: 1.0, y: 1.0 });
        bus.push(PageEvent::PointerDown { x: 1.0, y: 1.0 });
        bus.push(PageEvent::PointerMove { x: 5.0, y: 5.0 });
        bus.push(PageEvent::TouchMove { x: 6.0, y: 6.0 });
        assert_eq!(bus.len(), 4);
        assert_eq!(bus.coalesced(), 0);
    }
}
