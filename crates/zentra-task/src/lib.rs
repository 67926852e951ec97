//! Zentra Task
//!
//! Decides what kind of work a task description asks for and performs it.
//! [`classify`] maps a description to a [`TaskCategory`](zentra_config::TaskCategory);
//! [`Router`] applies the acceptance policy and dispatches to one of the
//! strategies in [`strategies`], each of which always produces an
//! [`ExecutionResult`], degrading rather than failing when its external
//! services misbehave.

mod classify;
mod error;
mod lenient;
mod prompts;
mod result;
mod router;
pub mod strategies;
mod target;

pub use classify::{
  Classification, DEFAULT_CONFIDENCE, KEYWORD_CONFIDENCE, TAG_CONFIDENCE, classify,
  strip_category_tag,
};
pub use error::TaskError;
pub use result::{
  AnalysisPayload, ExecutionResult, Finding, Payload, ResearchFinding, ResearchPayload,
  ResultStatus, RetrievalPayload, SummaryPayload, TopResult,
};
pub use router::{Evaluation, Execution, Router, evaluate};
pub use target::{find_url, infer_url};
