//! docfields-core - Core library for docfields.
//!
//! This crate provides the domain types, collaborator traits, configuration
//! and the extraction orchestrator for the docfields service.
//!
//! # Example
//!
//! ```ignore
//! use docfields_core::ExtractionService;
//!
//! let service = ExtractionService::new(model_client, record_store);
//! let outcome = service.extract("application/pdf", &pdf_bytes).await?;
//! println!("{}", outcome.fields.total_value);
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use error::{DocfieldsError, DocfieldsResult, ErrorCode};
pub use extraction::{ExtractionOutcome, ExtractionService};
pub use traits::{ModelClient, ModelInput, ModelRequest, ModelResponse, RecordStore, TokenUsage};
pub use types::{ExtractedFields, ExtractedRecord, MediaType};
