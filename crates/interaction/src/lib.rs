pub mod camera;
pub mod selection;
pub mod tracker;

pub use camera::*;
pub use selection::*;
pub use tracker::*;
