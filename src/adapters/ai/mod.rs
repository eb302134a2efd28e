//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for tests and offline runs
//!   (`MockAIProvider::offline()` answers every pipeline prompt)
//! - `OpenAIProvider` - OpenAI-compatible chat completion APIs

mod mock_provider;
mod offline;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, ScriptFn};
pub use offline::offline_reply;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
