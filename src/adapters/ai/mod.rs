//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI chat completions (JSON mode)
//! - `MockAIProvider` - Configurable mock for testing and dry runs

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_COMPLETION};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
