//! Anthropic value resolver for SmartFill.

mod api;
mod form_type;
mod prompt;
mod resolver;

pub use form_type::FormType;
pub use prompt::build_prompt;
pub use resolver::{AnthropicResolver, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
