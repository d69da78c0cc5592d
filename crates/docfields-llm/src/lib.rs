//! docfields-llm - Generative model clients for docfields.
//!
//! # Supported Providers
//!
//! - **Gemini** - `generateContent` over REST, text and inline image input
//!
//! # Example
//!
//! ```ignore
//! use docfields_llm::ModelFactory;
//!
//! let model = ModelFactory::from_config(&config.model)?;
//! let reply = model.generate(&request).await?;
//! ```

mod factory;
mod gemini;
mod unconfigured;

pub use factory::ModelFactory;
pub use gemini::GeminiClient;
pub use unconfigured::UnconfiguredModel;

// Re-export core types for convenience
pub use docfields_core::config::ModelConfig;
pub use docfields_core::traits::{ModelClient, ModelInput, ModelRequest, ModelResponse};
