//! Source-control operations over an external VCS executor.
//!
//! Every operation here shells out through a [`VcsExecutor`], so callers
//! (and tests) decide how commands actually run. The porcelain parsers in
//! [`history`] and [`blame`] and the marker rewriting in [`conflict`] are
//! pure; only the thin wrappers around them touch processes or files.

pub mod blame;
pub mod branch;
pub mod commit;
pub mod conflict;
pub mod executor;
mod fs;
pub mod history;
pub mod release;
pub mod reviewers;

#[cfg(test)]
mod testing;

pub use executor::{ExecOutput, ProcessExecutor, VcsExecutor};
