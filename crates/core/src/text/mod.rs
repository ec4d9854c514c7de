mod markdown;
mod polish;
mod slug;

pub use markdown::*;
pub use polish::*;
pub use slug::*;
