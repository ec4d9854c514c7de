//! Chat-completion gateway for an OpenAI-compatible provider.

pub mod error;
pub mod gateway;
pub mod profile;
pub mod request;
pub mod types;

pub use error::{LlmError, LlmResult};
pub use gateway::{ChatGateway, ChatModel, GatewayConfig, FAKE_RUN_RESPONSE};
pub use profile::{ModelProfile, TokenField};
pub use request::ChatRequest;
pub use types::{ChatMessage, Role};
