#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use data::detail::DetailState;
    use data::geolocation::StaticGeolocator;
    use data::http::HttpDataLayer;
    use foundation::bounds::BoundingBox;
    use foundation::location::Location;
    use foundation::time::TimeRange;
    use layers::layer::POINT_LAYER_ID;
    use layers::symbology::SentimentLabel;
    use runtime::clock::{Clock, MonotonicClock};
    use std::time::Duration;
    use surface::headless::HeadlessFactory;
    use surface::layer::LayerId;
    use tracing::{info, warn};
    use tracing_subscriber::EnvFilter;
    use viewer::{App, Driver, ViewerConfig};

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Headless run of the location map against a live API")]
    struct Args {
        /// API base URL (default: SCRAPEY_API_BASE or http://127.0.0.1:8000/api)
        #[arg(long)]
        api_base: Option<String>,

        /// Mention time range: all, week or day
        #[arg(long, default_value = "all")]
        time_range: String,

        /// Bounding box: minLon,minLat,maxLon,maxLat
        #[arg(long)]
        bbox: Option<String>,

        /// Search query to run after the heatmap loads
        #[arg(long)]
        search: Option<String>,

        /// Index of the search result to open
        #[arg(long)]
        select: Option<usize>,
    }

    fn parse_bbox(raw: &str) -> Result<BoundingBox, String> {
        let parts: Vec<f64> = raw
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|err| format!("invalid bbox {raw:?}: {err}"))?;
        match parts.as_slice() {
            [min_lng, min_lat, max_lng, max_lat] => {
                Ok(BoundingBox::new(*min_lat, *max_lat, *min_lng, *max_lng))
            }
            _ => Err(format!("bbox needs four numbers, got {raw:?}")),
        }
    }

    fn describe(location: &Location) -> String {
        format!(
            "{} [{}] {} - {} mentions, {:+.2} ({})",
            location.name,
            location.place_type,
            location.display_city(),
            location.mention_count,
            location.avg_sentiment,
            SentimentLabel::from_score(location.avg_sentiment),
        )
    }

    pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();

        let args = Args::parse();
        let mut config = ViewerConfig::from_env()?;
        if let Some(api_base) = args.api_base {
            config.api_base = api_base;
        }
        if config.require_token().is_err() {
            warn!("no Mapbox token; the headless surface does not need one");
            config = config.with_access_token("headless");
        }
        let time_range = TimeRange::parse(&args.time_range)
            .ok_or_else(|| format!("unknown time range {:?}", args.time_range))?;
        let bbox = args.bbox.as_deref().map(parse_bbox).transpose()?;

        let data = HttpDataLayer::new(config.api_base.clone());
        let geolocator = StaticGeolocator::unsupported();
        let driver = Driver::new(&data, &geolocator);
        let factory = HeadlessFactory::new();
        let mut app = App::new(factory.clone(), &config, "headless");

        let mut commands = app.mount();
        let probe = factory
            .last_probe()
            .ok_or("headless surface was not created")?;
        probe.fire_load();
        commands.extend(app.pump());
        commands.extend(app.set_time_range(time_range));
        commands.extend(app.set_bbox(bbox));
        driver.run(&mut app, commands).await;

        if let Some(banner) = app.banner() {
            return Err(banner.to_string().into());
        }
        let shown = app.map().layers().applied().len();
        let points = probe.rendered(&LayerId::new(POINT_LAYER_ID), 11.0);
        info!(range = %app.time_range(), shown, "heatmap loaded");
        println!("{} locations ({})", shown, app.time_range().label());
        for point in points.iter().take(10) {
            let name = point
                .properties
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("?");
            println!(
                "  {name}: radius {:.1}, color {}",
                point.radius.unwrap_or_default(),
                point.color.map(|c| c.to_css()).unwrap_or_default(),
            );
        }

        let Some(query) = args.search else {
            return Ok(());
        };
        let clock = MonotonicClock::new();
        app.set_query(clock.now(), query.as_str());
        while let Some(deadline) = app.next_deadline() {
            let wait = deadline.saturating_since(clock.now());
            tokio::time::sleep(Duration::from_millis(wait)).await;
            let search = app.tick(clock.now());
            driver.run(&mut app, search).await;
        }
        if let Some(banner) = app.banner() {
            return Err(banner.to_string().into());
        }
        if app.search().no_results() {
            println!("No locations found for {query:?}");
            return Ok(());
        }
        for (i, location) in app.search().visible_results().iter().enumerate() {
            println!("{i:>3}. {}", describe(location));
        }

        let Some(index) = args.select else {
            return Ok(());
        };
        let fetch = app.pick_search_result(index);
        if fetch.is_empty() {
            return Err(format!("no search result at index {index}").into());
        }
        driver.run(&mut app, fetch).await;

        match app.detail().detail() {
            Some(detail) => {
                println!("{}", describe(&detail.to_location()));
                for mention in app.detail().recent_mentions() {
                    println!(
                        "  r/{} {:+.2}: {}",
                        mention.post.subreddit,
                        mention.sentiment_score,
                        mention.context.as_deref().unwrap_or(""),
                    );
                }
                if let Some(fly) = probe.animation_target() {
                    println!(
                        "camera -> [{:.4}, {:.4}] zoom {}",
                        fly.center.lng, fly.center.lat, fly.zoom
                    );
                }
            }
            None => {
                if let DetailState::Failed { message, .. } = app.detail().state() {
                    return Err(message.clone().into());
                }
            }
        }

        app.unmount();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
