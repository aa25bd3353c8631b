//! Bounded event buffering between a format plugin and its consumer.
//!
//! ```text
//! EventSource          EventRing              Reader            Consumer
//!     │                     │                    │                  │
//!     │──emit(event)───────▶│                    │                  │
//!     │                     │◀──pop()────────────│◀──next_event()───│
//!     │                     │                    │──validated event─▶│
//!     │◀──space() == 0──────│                    │                  │
//! ```
//!
//! A source may need to emit several events per input unit (an alignment
//! row emits a sequence start, token runs and a part end). The ring bounds
//! how far a source can run ahead of the consumer.

use crate::event::Event;

/// FIFO of events with a fixed power-of-2 number of slots.
#[derive(Debug)]
pub struct EventRing {
    slots: Vec<Option<Event>>,
    /// Next slot to pop.
    head: usize,
    /// Next slot to fill.
    tail: usize,
    len: usize,
    /// `slots.len() - 1`
    mask: usize,
}

/// Upper bound on the slots of one ring.
pub const MAX_CAPACITY: usize = 1 << 16;

impl EventRing {
    /// At least `min_capacity` slots, rounded up to a power of 2, never fewer
    /// than 2 and never more than [`MAX_CAPACITY`].
    pub fn new(min_capacity: usize) -> Self {
        let capacity = min_capacity
            .clamp(2, MAX_CAPACITY)
            .checked_next_power_of_two()
            .unwrap_or(MAX_CAPACITY);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
            mask: capacity - 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free slots.
    #[inline]
    pub fn space(&self) -> usize {
        self.capacity() - self.len
    }

    /// Append `event`, or hand it back when every slot is taken.
    #[inline]
    pub fn try_push(&mut self, event: Event) -> Result<(), Event> {
        if self.space() == 0 {
            return Err(event);
        }
        self.slots[self.tail] = Some(event);
        self.tail = (self.tail + 1) & self.mask;
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Event> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.head].take();
        self.head = (self.head + 1) & self.mask;
        self.len -= 1;
        event
    }

    #[inline]
    pub fn front(&self) -> Option<&Event> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// Drop every buffered event.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
        self.head = 0;
        self.tail = 0;
    }
}

impl Default for EventRing {
    fn default() -> Self {
        Self::new(crate::params::DEFAULT_LOOKAHEAD_CAPACITY)
    }
}
