pub mod batch;
pub mod loaders;
pub mod record;
pub mod result;

pub use batch::{split_batches, Batch};
pub use loaders::{load_ibw_lsrs, load_prompt};
pub use record::{identify, LsrRecord, LsrReport, RecordId};
pub use result::{ffsi_score, ClassificationResult, JobState, PROB_SUM_TOLERANCE};
