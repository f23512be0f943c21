pub mod app;
pub mod config;
pub mod driver;
pub mod lifecycle;
pub mod map_view;
pub mod popup_html;

#[cfg(target_arch = "wasm32")]
pub mod mapbox;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::*;
pub use config::*;
pub use driver::*;
pub use lifecycle::*;
pub use map_view::*;
