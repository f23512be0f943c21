//! Page-level state: time filter, search, selection, detail panel and the
//! error banner around one [`MapView`].
//!
//! The app performs no I/O. Operations return [`AppCommand`]s; whoever runs
//! them (see [`crate::driver`]) feeds the results back through
//! [`App::handle`].

use data::detail::{DetailLoader, DetailOutcome, DetailState, DetailTicket};
use data::error::DataError;
use data::feed::{FeedOutcome, FetchTicket, LocationsFeed};
use data::geolocation::{GeolocationError, GeolocationState, Position, PositionOptions};
use data::protocol::LocationDetail;
use data::search::{SearchController, SearchOutcome, SearchRequest};
use foundation::bounds::BoundingBox;
use foundation::geo::LngLat;
use foundation::geojson::FeatureCollection;
use foundation::location::Location;
use foundation::time::{Millis, TimeRange};
use interaction::selection::{SelectionBridge, SelectionChange, SelectionOrigin};
use layers::features::collection_to_locations;
use serde::Serialize;
use surface::surface::SurfaceFactory;

use crate::config::ViewerConfig;
use crate::map_view::{MapEvent, MapView};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    FetchHeatmap(FetchTicket),
    Search(SearchRequest),
    FetchDetail(DetailTicket),
    LocateUser(PositionOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    HeatmapFetched {
        ticket: FetchTicket,
        result: Result<FeatureCollection, DataError>,
    },
    SearchFinished {
        request: SearchRequest,
        result: Result<Vec<Location>, DataError>,
    },
    DetailFetched {
        ticket: DetailTicket,
        result: Result<LocationDetail, DataError>,
    },
    Located(Result<Position, GeolocationError>),
}

/// Everything the page chrome renders, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub time_range: TimeRange,
    pub loading: bool,
    pub banner: Option<String>,
    pub diagnostic: Option<String>,
    pub query: String,
    pub search_loading: bool,
    pub results: Vec<Location>,
    pub no_results: bool,
    pub selected: Option<Location>,
    pub detail: Option<LocationDetail>,
    pub detail_loading: bool,
    pub detail_error: Option<String>,
    pub position: Option<LngLat>,
    pub geolocation_error: Option<&'static str>,
}

pub struct App<F: SurfaceFactory> {
    map: MapView<F>,
    feed: LocationsFeed,
    search: SearchController,
    selection: SelectionBridge,
    detail: DetailLoader,
    geolocation: GeolocationState,
    banner: Option<String>,
    mounted: bool,
}

impl<F: SurfaceFactory> App<F> {
    pub fn new(factory: F, config: &ViewerConfig, container: impl Into<String>) -> Self {
        Self {
            map: MapView::new(factory, config, container),
            feed: LocationsFeed::new(TimeRange::default()),
            search: SearchController::new(config.search_debounce_ms, config.search_limit),
            selection: SelectionBridge::new(),
            detail: DetailLoader::new(),
            geolocation: GeolocationState::default(),
            banner: None,
            mounted: false,
        }
    }

    pub fn map(&self) -> &MapView<F> {
        &self.map
    }

    pub fn feed(&self) -> &LocationsFeed {
        &self.feed
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn selection(&self) -> &SelectionBridge {
        &self.selection
    }

    pub fn selected(&self) -> Option<&Location> {
        self.selection.selected()
    }

    pub fn detail(&self) -> &DetailLoader {
        &self.detail
    }

    pub fn geolocation(&self) -> &GeolocationState {
        &self.geolocation
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn time_range(&self) -> TimeRange {
        self.feed.time_range()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let detail_error = match self.detail.state() {
            DetailState::Failed { message, .. } => Some(message.clone()),
            _ => None,
        };
        ViewSnapshot {
            time_range: self.time_range(),
            loading: self.map.loading(),
            banner: self.banner.clone(),
            diagnostic: self.map.diagnostic().map(|err| err.to_string()),
            query: self.search.query().to_string(),
            search_loading: self.search.loading(),
            results: self.search.visible_results().to_vec(),
            no_results: self.search.no_results(),
            selected: self.selected().cloned(),
            detail: self.detail.detail().cloned(),
            detail_loading: self.detail.loading(),
            detail_error,
            position: self.geolocation.position.map(|p| p.coordinate),
            geolocation_error: self.geolocation.error_message(),
        }
    }

    /// When [`tick`](Self::tick) next has work to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.search.next_deadline()
    }

    /// Creates the map and starts the first heatmap fetch and the position
    /// lookup. Mounting twice does nothing.
    pub fn mount(&mut self) -> Vec<AppCommand> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        if let Err(err) = self.map.mount() {
            tracing::error!(%err, "map could not be created");
            self.banner = Some(format!("Map unavailable: {err}"));
        }
        self.geolocation.begin();
        vec![
            self.fetch_heatmap(),
            AppCommand::LocateUser(PositionOptions::default()),
        ]
    }

    /// Applies everything the surface has reported since the last call.
    pub fn pump(&mut self) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        let mut commands = Vec::new();
        for event in self.map.process_events() {
            match event {
                MapEvent::Ready => {}
                MapEvent::SelectionCandidate(location) => {
                    commands.extend(self.select(location, SelectionOrigin::MapClick));
                }
                MapEvent::SurfaceError(message) => {
                    self.banner = Some(format!("Map error: {message}"));
                }
            }
        }
        commands
    }

    pub fn set_time_range(&mut self, time_range: TimeRange) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        match self.feed.set_time_range(time_range) {
            Some(ticket) => self.started(ticket),
            None => Vec::new(),
        }
    }

    pub fn set_bbox(&mut self, bbox: Option<BoundingBox>) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        match self.feed.set_bbox(bbox) {
            Some(ticket) => self.started(ticket),
            None => Vec::new(),
        }
    }

    /// Manual retry of the heatmap for the active filter.
    pub fn refetch(&mut self) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        vec![self.fetch_heatmap()]
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
        self.feed.clear_error();
    }

    /// Search box edit at `now`. The request goes out from a later
    /// [`tick`](Self::tick).
    pub fn set_query(&mut self, now: Millis, query: impl Into<String>) {
        if self.mounted {
            self.search.set_query(now, query);
        }
    }

    pub fn focus_search(&mut self) {
        self.search.focus();
    }

    pub fn dismiss_search(&mut self) {
        self.search.dismiss();
    }

    /// Fires due timers.
    pub fn tick(&mut self, now: Millis) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        self.search
            .poll(now, self.feed.time_range())
            .map(AppCommand::Search)
            .into_iter()
            .collect()
    }

    /// Selects the `index`-th visible search result.
    pub fn pick_search_result(&mut self, index: usize) -> Vec<AppCommand> {
        if !self.mounted {
            return Vec::new();
        }
        let Some(location) = self.search.visible_results().get(index).cloned() else {
            return Vec::new();
        };
        self.search.pick();
        self.select(location, SelectionOrigin::SearchPick)
    }

    /// Closes the detail panel. Search state is left as it is.
    pub fn close_selection(&mut self) {
        if !self.mounted {
            return;
        }
        self.selection.close();
        self.detail.reset();
    }

    fn select(&mut self, location: Location, origin: SelectionOrigin) -> Vec<AppCommand> {
        let SelectionChange {
            clear_search_results,
            focus,
            load_detail,
        } = self.selection.select(location, origin);
        if clear_search_results {
            self.search.clear_results();
        }
        self.map.focus(focus);
        let Some(id) = load_detail else {
            return Vec::new();
        };
        if let Some(ticket) = self.detail.load(id) {
            return vec![AppCommand::FetchDetail(ticket)];
        }
        // Detail for `id` is already on hand: a coordinate-less pick resolves from it.
        let known = self
            .detail
            .detail()
            .filter(|d| d.id == id)
            .map(|d| d.coordinate());
        if let Some(at) = known.and_then(|c| self.selection.resolve_coordinate(id, c)) {
            self.map.focus(Some(at));
        }
        Vec::new()
    }

    fn fetch_heatmap(&mut self) -> AppCommand {
        let ticket = self.feed.request();
        self.map.set_loading(true);
        AppCommand::FetchHeatmap(ticket)
    }

    fn started(&mut self, ticket: FetchTicket) -> Vec<AppCommand> {
        self.map.set_loading(true);
        vec![AppCommand::FetchHeatmap(ticket)]
    }

    /// Applies the result of a command. Ignored once unmounted.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppCommand> {
        if !self.mounted {
            tracing::debug!("result after unmount dropped");
            return Vec::new();
        }
        match event {
            AppEvent::HeatmapFetched { ticket, result } => {
                match self.feed.complete(ticket.seq, result) {
                    FeedOutcome::Applied(collection) => {
                        let locations = collection_to_locations(&collection);
                        self.map.update_data(&locations);
                        self.banner = None;
                    }
                    FeedOutcome::Failed(err) => {
                        self.banner = Some(format!("Error loading data: {err}"));
                    }
                    FeedOutcome::Stale => {
                        tracing::debug!(seq = ticket.seq.0, "stale heatmap response dropped");
                    }
                }
                self.map.set_loading(self.feed.loading());
            }
            AppEvent::SearchFinished { request, result } => {
                match self.search.complete(request.seq, result) {
                    SearchOutcome::Failed(err) => {
                        self.banner = Some(format!("Search failed: {err}"));
                    }
                    SearchOutcome::Stale => {
                        tracing::debug!(query = %request.query, "stale search response dropped");
                    }
                    SearchOutcome::Applied { .. } => {}
                }
            }
            AppEvent::DetailFetched { ticket, result } => {
                if let DetailOutcome::Loaded(detail) = self.detail.complete(ticket, result) {
                    if let Some(at) = self
                        .selection
                        .resolve_coordinate(detail.id, detail.coordinate())
                    {
                        self.map.focus(Some(at));
                    }
                }
            }
            AppEvent::Located(result) => self.geolocation.complete(result),
        }
        Vec::new()
    }

    /// Cancels timers, drops every in-flight request, then tears the map down.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.search.cancel_all();
        self.feed.cancel();
        self.detail.reset();
        self.map.unmount();
        self.mounted = false;
        tracing::info!("viewer unmounted");
    }
}
