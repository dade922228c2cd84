//! Helpers shared by unit tests, integration tests, and benches.
//!
//! Both files are free of `crate::` paths so benches and integration tests
//! can include them with `#[path]` without enabling `test-support`.

pub mod apply;
pub mod fixture_source;

pub use apply::apply_edits;
