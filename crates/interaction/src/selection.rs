use foundation::geo::LngLat;
use foundation::ids::LocationId;
use foundation::location::Location;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// Click on a rendered point.
    MapClick,
    /// Pick from the search result list.
    SearchPick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub location: Location,
    pub origin: SelectionOrigin,
}

/// Follow-up work implied by a selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionChange {
    pub clear_search_results: bool,
    pub focus: Option<LngLat>,
    pub load_detail: Option<LocationId>,
}

/// Single authority for the selected location, whichever input produced it.
///
/// Selecting clears the search result list and focuses the camera when the
/// location has a coordinate. Closing leaves search results alone.
#[derive(Debug, Clone, Default)]
pub struct SelectionBridge {
    current: Option<Selection>,
}

impl SelectionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Location> {
        self.current.as_ref().map(|s| &s.location)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, id: LocationId) -> bool {
        self.selected().is_some_and(|l| l.id == id)
    }

    pub fn select(&mut self, location: Location, origin: SelectionOrigin) -> SelectionChange {
        tracing::debug!(id = %location.id, ?origin, "location selected");
        let change = SelectionChange {
            clear_search_results: true,
            focus: location.coordinate.filter(|c| c.is_finite()),
            load_detail: Some(location.id),
        };
        self.current = Some(Selection { location, origin });
        change
    }

    pub fn close(&mut self) -> SelectionChange {
        if let Some(prev) = self.current.take() {
            tracing::debug!(id = %prev.location.id, "selection closed");
        }
        SelectionChange::default()
    }

    /// Fills in the coordinate of the current selection once it is known.
    /// Returns the coordinate to focus when the selection was still unresolved.
    pub fn resolve_coordinate(&mut self, id: LocationId, coordinate: LngLat) -> Option<LngLat> {
        if !coordinate.is_finite() {
            return None;
        }
        let selection = self.current.as_mut().filter(|s| s.location.id == id)?;
        if selection.location.coordinate.is_some() {
            return None;
        }
        selection.location.coordinate = Some(coordinate);
        Some(coordinate)
    }
}
