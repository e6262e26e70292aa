//! Timer-driven event system.
//!
//! Events are produced by the main loop's interval checks (and, on target,
//! potentially by timer callbacks) and consumed by the control loop, which
//! drains them one at a time in FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Interval     │────▶│  Event Queue │────▶│  Main Loop   │
//! │ checks/timers│     │  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue is a `heapless` MPMC ring — lock-free, fixed capacity, safe to
//! push from ISR or timer-task context.

use heapless::mpmc::Q16;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Control loop tick — acquire temperature, evaluate, drive the fan.
    ControlTick,
    /// Telemetry report timer fired.
    TelemetryTick,
}

static EVENT_QUEUE: Q16<Event> = Q16::new();

/// Push an event into the queue. Lock-free; safe from ISR context.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    EVENT_QUEUE.enqueue(event).is_ok()
}

/// Pop the next event, if any. Called from the main loop.
pub fn pop_event() -> Option<Event> {
    EVENT_QUEUE.dequeue()
}

/// Drain all pending events into a callback, in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so nothing races on the shared static queue.
    #[test]
    fn fifo_roundtrip_and_drain() {
        assert!(push_event(Event::ControlTick));
        assert!(push_event(Event::TelemetryTick));
        assert!(push_event(Event::ControlTick));

        let mut seen = Vec::new();
        drain_events(|e| seen.push(e));
        assert_eq!(
            seen,
            [Event::ControlTick, Event::TelemetryTick, Event::ControlTick]
        );
        assert!(pop_event().is_none());
    }
}
