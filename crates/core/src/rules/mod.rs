mod campaign_rules;
mod classify;
mod market;
mod scoring;
mod variants;

pub use campaign_rules::*;
pub use classify::*;
pub use market::*;
pub use scoring::*;
pub use variants::*;
