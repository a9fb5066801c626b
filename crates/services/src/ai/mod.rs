mod client;
mod reply;

pub use client::{AiConfig, ChatPrompt, DEFAULT_TIMEOUT, OpenAiClient};
pub(crate) use client::timeout_from_env;
pub use reply::{parse_json_reply, strip_code_fence};
