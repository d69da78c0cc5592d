//! Collaborator traits.

mod model;
mod record_store;

pub use model::{ModelClient, ModelInput, ModelRequest, ModelResponse, TokenUsage};
pub use record_store::RecordStore;

#[cfg(test)]
pub use model::MockModelClient;
#[cfg(test)]
pub use record_store::MockRecordStore;
