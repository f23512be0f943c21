pub mod camera;
pub mod color;
pub mod control;
pub mod curve;
pub mod error;
pub mod event;
pub mod headless;
pub mod layer;
pub mod popup;
pub mod surface;

pub use camera::*;
pub use color::*;
pub use control::*;
pub use curve::*;
pub use error::*;
pub use event::*;
pub use layer::*;
pub use popup::*;
pub use surface::*;
