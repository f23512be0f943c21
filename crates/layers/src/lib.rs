pub mod features;
pub mod layer;
pub mod manager;
pub mod preview;
pub mod symbology;

pub use features::*;
pub use layer::*;
pub use manager::*;
pub use preview::*;
pub use symbology::*;
