pub mod clock;
pub mod event_bus;
pub mod sequence;
pub mod timers;

pub use clock::*;
pub use event_bus::*;
pub use sequence::*;
pub use timers::*;
