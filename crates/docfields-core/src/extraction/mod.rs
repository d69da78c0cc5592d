//! Extraction flow: prompt, reply parsing and the orchestrating service.

mod parser;
mod prompts;
mod service;

pub use parser::{parse_fields, strip_code_fences};
pub use prompts::extraction_prompt;
pub use service::{ExtractionOutcome, ExtractionService};
