//! Unified-diff validation and analysis.
//!
//! Pure functions over diff text: a syntactic validator, change statistics
//! with risky-pattern detection, impact classification (scope, dependency
//! manifests, API surface, test coverage gaps), and breaking-change
//! heuristics. The pattern tables in [`patterns`] are shared so every
//! analysis detects in the same order.

pub mod analysis;
pub mod breaking;
pub mod impact;
pub mod line;
pub mod patterns;
pub mod validate;

pub use analysis::{analyze, ChangeAnalysis};
pub use breaking::detect_breaking_changes;
pub use impact::{impact_analysis, ImpactAnalysis};
pub use validate::{validate, DiffValidationError, ValidationResult};
