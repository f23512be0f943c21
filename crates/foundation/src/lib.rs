pub mod bounds;
pub mod geo;
pub mod geojson;
pub mod ids;
pub mod location;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use geo::*;
pub use geojson::*;
pub use ids::*;
pub use location::*;
pub use time::*;
