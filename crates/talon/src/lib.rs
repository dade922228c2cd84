// lib.rs — Structural analysis and refactoring planning for Logtalk source.
//
// The crate works on line-oriented snapshots of documents. Lower layers find
// term boundaries and classify terms; the planner turns reference locations
// into non-overlapping LSP text edits.

pub mod arguments;
pub mod config;
pub mod context;
pub mod indicator;
pub mod planner;
pub mod scanner;
pub mod snapshot;
pub mod term_boundary;
// test_utils is available in test builds and when the `test-support` feature is enabled.
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod utf16;

pub use config::RefactorConfig;
pub use indicator::{Indicator, IndicatorKind};
pub use planner::{
    compute_argument_edits, compute_rename_edits, format_directive, plan_workspace_rename,
    ArgumentChange, CandidateLocation, DocumentRequest, RenameTarget,
};
pub use snapshot::{DocumentSnapshot, LineSource};
