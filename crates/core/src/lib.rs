pub mod domain;
pub mod error;
pub mod rules;
pub mod text;

pub use domain::*;
pub use error::CoreError;
pub use rules::*;
pub use text::{escape_html, markdown_to_html, polish_text, slugify, EMPTY_STATE_HTML};
