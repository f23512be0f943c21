use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use foundation::time::Millis;

/// Source of monotonic time for timers.
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Wall-clock backed monotonic time, measured from construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Millis {
        Millis(self.origin.elapsed().as_millis() as u64)
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start.0)),
        }
    }

    pub fn advance(&self, ms: u64) -> Millis {
        let next = self.now.get().saturating_add(ms);
        self.now.set(next);
        Millis(next)
    }

    pub fn set(&self, at: Millis) {
        self.now.set(at.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use foundation::time::Millis;

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new(Millis(10));
        let b = a.clone();
        a.advance(90);
        assert_eq!(b.now(), Millis(100));
        b.set(Millis(5));
        assert_eq!(a.now(), Millis(5));
    }
}
