//! Executes [`AppCommand`]s against the data layer and geolocator.

use std::collections::VecDeque;

use data::geolocation::Geolocator;
use data::layer::DataLayer;
use surface::surface::SurfaceFactory;

use crate::app::{App, AppCommand, AppEvent};

pub struct Driver<'a> {
    data: &'a dyn DataLayer,
    geolocator: &'a dyn Geolocator,
}

impl<'a> Driver<'a> {
    pub fn new(data: &'a dyn DataLayer, geolocator: &'a dyn Geolocator) -> Self {
        Self { data, geolocator }
    }

    /// Runs one command to completion.
    pub async fn execute(&self, command: AppCommand) -> AppEvent {
        match command {
            AppCommand::FetchHeatmap(ticket) => {
                let result = self.data.fetch_heatmap(ticket.time_range, ticket.bbox).await;
                AppEvent::HeatmapFetched { ticket, result }
            }
            AppCommand::Search(request) => {
                let result = self
                    .data
                    .search_locations(request.query.clone(), request.time_range, request.limit)
                    .await;
                AppEvent::SearchFinished { request, result }
            }
            AppCommand::FetchDetail(ticket) => {
                let result = self.data.fetch_location_detail(ticket.id).await;
                AppEvent::DetailFetched { ticket, result }
            }
            AppCommand::LocateUser(options) => {
                AppEvent::Located(self.geolocator.current_position(options).await)
            }
        }
    }

    /// Runs `commands` and everything they lead to, one at a time, pumping
    /// surface events between steps. Returns how many commands ran.
    pub async fn run<F: SurfaceFactory>(
        &self,
        app: &mut App<F>,
        commands: Vec<AppCommand>,
    ) -> usize {
        let mut queue: VecDeque<AppCommand> = commands.into();
        let mut executed = 0;
        while let Some(command) = queue.pop_front() {
            tracing::trace!(?command, "executing");
            let event = self.execute(command).await;
            executed += 1;
            queue.extend(app.handle(event));
            queue.extend(app.pump());
        }
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use data::detail::DetailState;
    use data::error::DataError;
    use data::geolocation::{GeolocationError, StaticGeolocator};
    use data::memory::{DataCall, MemoryDataLayer};
    use data::protocol::LocationDetail;
    use foundation::geo::LngLat;
    use foundation::ids::LocationId;
    use foundation::location::Location;
    use foundation::time::{Millis, TimeRange};
    use layers::features::locations_to_collection;
    use pretty_assertions::assert_eq;
    use surface::headless::{HeadlessFactory, SurfaceProbe};

    fn location(id: u64, name: &str, count: u64) -> Location {
        Location {
            id: LocationId(id),
            name: name.into(),
            place_type: "beach".into(),
            city: Some("Honolulu".into()),
            mention_count: count,
            avg_sentiment: 0.4,
            coordinate: Some(LngLat::new(-157.82, 21.27)),
        }
    }

    fn detail(id: u64, name: &str) -> LocationDetail {
        LocationDetail {
            id: LocationId(id),
            name: name.into(),
            lat: 21.2793,
            lng: -157.8292,
            place_type: "beach".into(),
            city: Some("Honolulu".into()),
            state: "HI".into(),
            created_at: "2024-01-01T00:00:00".into(),
            mention_count: 42,
            avg_sentiment: 0.4,
            recent_mentions: Vec::new(),
        }
    }

    fn mounted() -> (App<HeadlessFactory>, SurfaceProbe, Vec<AppCommand>) {
        let factory = HeadlessFactory::new();
        let config = ViewerConfig::default().with_access_token("pk.test");
        let mut app = App::new(factory.clone(), &config, "map");
        let mut commands = app.mount();
        let probe = factory.last_probe().unwrap();
        probe.fire_load();
        commands.extend(app.pump());
        (app, probe, commands)
    }

    #[tokio::test]
    async fn mount_loads_heatmap_onto_the_map() {
        let data = MemoryDataLayer::new().with_heatmap(
            TimeRange::All,
            locations_to_collection(&[location(1, "Waikiki Beach", 40), location(2, "Diamond Head", 8)]),
        );
        let geo = StaticGeolocator::at(LngLat::new(-157.8, 21.3), 15.0);
        let (mut app, probe, commands) = mounted();

        let driver = Driver::new(&data, &geo);
        assert_eq!(driver.run(&mut app, commands).await, 2);

        let shown = probe.source_data(app.map().layers().source_id()).unwrap();
        assert_eq!(shown.len(), 2);
        assert!(!app.map().loading());
        assert_eq!(
            app.geolocation().position.map(|p| p.accuracy),
            Some(15.0)
        );
    }

    #[tokio::test]
    async fn search_pick_resolves_coordinate_from_detail_and_focuses() {
        let data = MemoryDataLayer::new()
            .with_locations(vec![location(7, "Waikiki Beach", 42)])
            .with_detail(detail(7, "Waikiki Beach"));
        let geo = StaticGeolocator::unsupported();
        let (mut app, probe, commands) = mounted();
        let driver = Driver::new(&data, &geo);
        driver.run(&mut app, commands).await;

        app.set_query(Millis(0), "waik");
        let search = app.tick(Millis(300));
        driver.run(&mut app, search).await;
        assert_eq!(app.search().visible_results().len(), 1);
        assert_eq!(app.search().visible_results()[0].coordinate, None);

        let detail_fetch = app.pick_search_result(0);
        assert!(probe.fly_history().is_empty(), "no coordinate yet");
        driver.run(&mut app, detail_fetch).await;

        let fly = probe.animation_target().unwrap();
        assert_eq!(fly.center, LngLat::new(-157.8292, 21.2793));
        assert_eq!(fly.zoom, 14.0);
        assert_eq!(app.detail().detail().map(|d| d.name.as_str()), Some("Waikiki Beach"));
        assert_eq!(app.search().query(), "");
        assert!(
            data.calls()
                .contains(&DataCall::Detail(LocationId(7)))
        );
    }

    #[tokio::test]
    async fn failures_become_state_not_errors() {
        let data = MemoryDataLayer::new();
        data.fail_next(DataError::http(503, Some("Database unavailable".into())));
        let geo = StaticGeolocator(Err(GeolocationError::Timeout));
        let (mut app, _probe, commands) = mounted();

        Driver::new(&data, &geo).run(&mut app, commands).await;
        assert_eq!(app.banner(), Some("Error loading data: Database unavailable"));
        assert_eq!(
            app.geolocation().error_message(),
            Some("The request to get user location timed out")
        );
    }

    #[tokio::test]
    async fn unknown_detail_shows_failure_in_panel() {
        let data = MemoryDataLayer::new();
        let geo = StaticGeolocator::unsupported();
        let (mut app, probe, commands) = mounted();
        let driver = Driver::new(&data, &geo);
        driver.run(&mut app, commands).await;

        let feature = layers::features::location_to_feature(&location(99, "Nowhere", 1)).unwrap();
        probe.click(&app.map().layers().point_layer(), feature);
        let fetch = app.pump();
        driver.run(&mut app, fetch).await;

        assert_eq!(
            app.detail().state(),
            &DetailState::Failed {
                id: LocationId(99),
                message: "Location not found".into()
            }
        );
        assert_eq!(app.banner(), None);
    }
}
