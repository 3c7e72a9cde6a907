pub mod llm_service;
pub mod report_writer;
pub mod result_store;

pub use llm_service::{Classifier, ClassifyOutcome, LlmService};
pub use report_writer::write_report;
pub use result_store::ResultStore;
