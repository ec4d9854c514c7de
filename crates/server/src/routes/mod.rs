mod briefs;
mod campaigns;
mod health;
mod outputs;
mod phases;
mod reference;
mod tools;

pub use briefs::*;
pub use campaigns::*;
pub use health::*;
pub use outputs::*;
pub use phases::*;
pub use reference::*;
pub use tools::*;
