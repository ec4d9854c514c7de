mod brief;
mod campaign;
mod output;
mod phase;
mod reference;

pub use brief::*;
pub use campaign::*;
pub use output::*;
pub use phase::*;
pub use reference::*;
