use foundation::ids::LocationId;
use runtime::sequence::{RequestSeq, Sequencer};

use crate::error::DataError;
use crate::protocol::{LocationDetail, Mention};

/// Mentions shown in the detail panel.
pub const RECENT_MENTIONS: usize = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub seq: RequestSeq,
    pub id: LocationId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(LocationId),
    Loaded(Box<LocationDetail>),
    Failed { id: LocationId, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Loaded(Box<LocationDetail>),
    Failed(DataError),
    Stale,
}

/// Detail panel data for the selected location.
#[derive(Debug, Default)]
pub struct DetailLoader {
    state: DetailState,
    seq: Sequencer,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn loading(&self) -> bool {
        matches!(self.state, DetailState::Loading(_))
    }

    pub fn detail(&self) -> Option<&LocationDetail> {
        match &self.state {
            DetailState::Loaded(detail) => Some(&**detail),
            _ => None,
        }
    }

    pub fn recent_mentions(&self) -> &[Mention] {
        match self.detail() {
            Some(d) => &d.recent_mentions[..d.recent_mentions.len().min(RECENT_MENTIONS)],
            None => &[],
        }
    }

    fn current_id(&self) -> Option<LocationId> {
        match &self.state {
            DetailState::Idle => None,
            DetailState::Loading(id) => Some(*id),
            DetailState::Loaded(detail) => Some(detail.id),
            DetailState::Failed { id, .. } => Some(*id),
        }
    }

    /// Starts loading `id`. Already loading or showing `id` issues nothing.
    pub fn load(&mut self, id: LocationId) -> Option<DetailTicket> {
        if self.current_id() == Some(id) && !matches!(self.state, DetailState::Failed { .. }) {
            return None;
        }
        self.state = DetailState::Loading(id);
        Some(DetailTicket {
            seq: self.seq.issue(),
            id,
        })
    }

    pub fn complete(
        &mut self,
        ticket: DetailTicket,
        result: Result<LocationDetail, DataError>,
    ) -> DetailOutcome {
        if self.state != DetailState::Loading(ticket.id) || !self.seq.accept(ticket.seq) {
            return DetailOutcome::Stale;
        }
        match result {
            Ok(detail) if detail.id == ticket.id => {
                let detail = Box::new(detail);
                self.state = DetailState::Loaded(detail.clone());
                DetailOutcome::Loaded(detail)
            }
            Ok(detail) => {
                let err = DataError::Decode(format!(
                    "asked for location {}, got {}",
                    ticket.id, detail.id
                ));
                self.fail(ticket.id, err)
            }
            Err(err) => self.fail(ticket.id, err),
        }
    }

    fn fail(&mut self, id: LocationId, err: DataError) -> DetailOutcome {
        tracing::warn!(%id, %err, "location detail failed");
        self.state = DetailState::Failed {
            id,
            message: err.to_string(),
        };
        DetailOutcome::Failed(err)
    }

    pub fn reset(&mut self) {
        self.seq.invalidate();
        self.state = DetailState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailLoader, DetailOutcome, DetailState};
    use crate::error::DataError;
    use crate::protocol::LocationDetail;
    use foundation::ids::LocationId;
    use pretty_assertions::assert_eq;

    fn detail(id: u64) -> LocationDetail {
        LocationDetail {
            id: LocationId::new(id),
            name: format!("Spot {id}"),
            lat: 21.3,
            lng: -157.8,
            place_type: "park".into(),
            city: None,
            state: "HI".into(),
            created_at: "2024-01-01T00:00:00".into(),
            mention_count: 0,
            avg_sentiment: 0.0,
            recent_mentions: Vec::new(),
        }
    }

    #[test]
    fn response_for_previous_selection_is_dropped() {
        let mut loader = DetailLoader::new();
        let first = loader.load(LocationId::new(1)).unwrap();
        let second = loader.load(LocationId::new(2)).unwrap();

        assert_eq!(loader.complete(first, Ok(detail(1))), DetailOutcome::Stale);
        assert!(matches!(
            loader.complete(second, Ok(detail(2))),
            DetailOutcome::Loaded(_)
        ));
        assert_eq!(loader.detail().map(|d| d.id), Some(LocationId::new(2)));
    }

    #[test]
    fn same_id_is_not_refetched_unless_failed() {
        let mut loader = DetailLoader::new();
        let t = loader.load(LocationId::new(1)).unwrap();
        assert_eq!(loader.load(LocationId::new(1)), None);

        loader.complete(t, Err(DataError::http(404, Some("Location not found".into()))));
        assert_eq!(
            loader.state(),
            &DetailState::Failed {
                id: LocationId::new(1),
                message: "Location not found".into()
            }
        );
        assert!(loader.load(LocationId::new(1)).is_some());
    }

    #[test]
    fn reset_drops_in_flight() {
        let mut loader = DetailLoader::new();
        let t = loader.load(LocationId::new(3)).unwrap();
        loader.reset();
        assert_eq!(loader.complete(t, Ok(detail(3))), DetailOutcome::Stale);
        assert_eq!(loader.state(), &DetailState::Idle);
    }
}
