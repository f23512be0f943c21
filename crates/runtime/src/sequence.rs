use tracing::debug;

/// Identifies one issued request so its response can be matched later.
///
/// Small and copyable so it can travel through command queues and back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

/// Latest-wins request sequencing.
///
/// Every `issue` supersedes all earlier requests. A response is applied only if
/// its sequence is still the current one, so a slow stale response can never
/// overwrite a newer one.
#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
    current: Option<RequestSeq>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        let seq = RequestSeq(self.next);
        self.next = self.next.wrapping_add(1);
        self.current = Some(seq);
        seq
    }

    pub fn current(&self) -> Option<RequestSeq> {
        self.current
    }

    pub fn is_current(&self, seq: RequestSeq) -> bool {
        self.current == Some(seq)
    }

    /// Accepts `seq` if current and retires it; otherwise reports it stale.
    pub fn accept(&mut self, seq: RequestSeq) -> bool {
        if self.is_current(seq) {
            self.current = None;
            true
        } else {
            debug!(seq = seq.0, current = ?self.current.map(|s| s.0), "dropping stale response");
            false
        }
    }

    /// Retires whatever is in flight without issuing a replacement.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }
}
