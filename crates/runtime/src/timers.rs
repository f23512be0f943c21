//! Deterministic one-shot timer queue.
//!
//! Key properties:
//! - Total ordering on `(deadline, id)`; equal deadlines fire in scheduling order.
//! - Cancellation removes the timer without perturbing the order of the rest.
//! - Nothing fires on its own: the owner calls [`TimerQueue::pop_due`] with the
//!   current time, so behavior is reproducible under a manual clock.
//!
//! Vec-backed because the engine only ever holds a handful of timers.

use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Entry<T> {
    deadline: Millis,
    id: TimerId,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, deadline: Millis, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            deadline,
            id,
            payload,
        });
        id
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Cancels every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Pops the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(TimerId, T)> {
        let mut best: Option<usize> = None;
        for (idx, e) in self.entries.iter().enumerate() {
            if e.deadline > now {
                continue;
            }
            match best {
                None => best = Some(idx),
                Some(b) => {
                    let cur = &self.entries[b];
                    if (e.deadline, e.id) < (cur.deadline, cur.id) {
                        best = Some(idx);
                    }
                }
            }
        }

        let idx = best?;
        let entry = self.entries.remove(idx);
        Some((entry.id, entry.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use foundation::time::Millis;

    #[test]
    fn fires_only_when_due() {
        let mut q = TimerQueue::new();
        q.schedule(Millis(300), "a");
        assert!(q.pop_due(Millis(299)).is_none());
        let (_, v) = q.pop_due(Millis(300)).unwrap();
        assert_eq!(v, "a");
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(Millis(5), "first");
        q.schedule(Millis(5), "second");
        q.schedule(Millis(1), "earliest");
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(Millis(10)).map(|(_, v)| v)).collect();
        assert_eq!(order, vec!["earliest", "first", "second"]);
    }

    #[test]
    fn cancel_and_clear() {
        let mut q = TimerQueue::new();
        let a = q.schedule(Millis(1), 1);
        q.schedule(Millis(2), 2);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.next_deadline(), Some(Millis(2)));
        assert_eq!(q.clear(), 1);
        assert!(q.pop_due(Millis(100)).is_none());
    }
}
