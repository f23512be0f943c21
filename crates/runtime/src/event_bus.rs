use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Single-threaded message passing from surface callbacks into component state.
///
/// Callbacks registered on a rendering surface only hold an [`EventSender`];
/// they never touch component state directly. The owner drains the queue at a
/// point of its choosing, so there is no reentrancy while state is borrowed.
///
/// Closing the queue is terminal: events sent afterwards are dropped, which is
/// how teardown guarantees that late callbacks have no observable effect.
#[derive(Debug)]
pub struct EventQueue<E> {
    inner: Rc<RefCell<Inner<E>>>,
}

#[derive(Debug)]
struct Inner<E> {
    events: VecDeque<E>,
    closed: bool,
    dropped: u64,
}

#[derive(Debug)]
pub struct EventSender<E> {
    inner: Rc<RefCell<Inner<E>>>,
}

impl<E> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                events: VecDeque::new(),
                closed: false,
                dropped: 0,
            })),
        }
    }

    pub fn sender(&self) -> EventSender<E> {
        EventSender {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    /// Number of events rejected because the queue was closed.
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }

    pub fn pop(&self) -> Option<E> {
        self.inner.borrow_mut().events.pop_front()
    }

    pub fn drain(&self) -> Vec<E> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    /// Closes the queue and discards anything still pending.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        inner.events.clear();
    }
}

impl<E> EventSender<E> {
    /// Enqueues `event`. Returns `false` if the queue has been closed.
    pub fn send(&self, event: E) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            inner.dropped += 1;
            return false;
        }
        inner.events.push_back(event);
        true
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }
}

#[cfg(test)]
mod tests {
    use super::EventQueue;

    #[test]
    fn delivers_in_send_order() {
        let q = EventQueue::new();
        let tx = q.sender();
        tx.send("a");
        tx.clone().send("b");
        assert_eq!(q.drain(), vec!["a", "b"]);
        assert!(q.is_empty());
    }

    #[test]
    fn close_drops_pending_and_late_events() {
        let q = EventQueue::new();
        let tx = q.sender();
        tx.send(1);
        q.close();
        assert!(q.is_empty());
        assert!(!tx.send(2));
        assert!(tx.is_closed());
        assert_eq!(q.pop(), None);
        assert_eq!(q.dropped(), 1);
    }
}
