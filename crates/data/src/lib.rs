pub mod detail;
pub mod error;
pub mod feed;
#[cfg(target_arch = "wasm32")]
pub mod fetch;
pub mod geolocation;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod layer;
pub mod memory;
pub mod protocol;
pub mod search;

pub use detail::*;
pub use error::*;
pub use feed::*;
pub use geolocation::*;
pub use layer::*;
pub use protocol::*;
pub use search::*;
