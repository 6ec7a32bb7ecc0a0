//! Syntactic validation of unified diff text.
//!
//! This is a pure text-format check. It does not look at a repository and it
//! does not require hunk ranges to be numeric: a hunk header only has to split
//! into `@@ -<old> +<new> @@`.

/// First-line markers a diff may open with.
const START_MARKERS: [&str; 3] = ["diff", "---", "+++"];

/// Prefixes accepted on every non-empty line outside hunk headers.
const LINE_PREFIXES: [&str; 7] = [" ", "+", "-", "\\", "diff", "---", "+++"];

/// Why a diff failed validation.
///
/// Display strings are stable and suitable for showing to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffValidationError {
    /// Zero-length input.
    #[error("Diff content cannot be empty")]
    Empty,

    /// Whitespace-only input, or the first non-blank line is not a diff header.
    #[error("Diff must start with 'diff', '---', or '+++'")]
    BadStart,

    /// An `@@` line without two delimiters or without two range tokens.
    #[error("Invalid hunk header format at line {line}: {text}")]
    MalformedHunkHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// An `@@` line whose range tokens do not start with `-` and `+`.
    #[error("Invalid line numbers in hunk header at line {line}: {text}")]
    BadHunkRange {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// A non-empty line with an unrecognized prefix.
    #[error("Invalid line prefix at line {line}: {text}")]
    BadLinePrefix {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// No `@@` line anywhere in the input.
    #[error("Diff must contain at least one hunk (@@ section)")]
    NoHunks,
}

impl DiffValidationError {
    /// 1-based line number of the failure, when it is tied to a line.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_difflens::validate;
    ///
    /// let err = validate("--- a/x\n+++ b/x\n@@ bogus\n").unwrap_err();
    /// assert_eq!(err.line(), Some(3));
    /// ```
    pub fn line(&self) -> Option<usize> {
        match self {
            DiffValidationError::MalformedHunkHeader { line, .. }
            | DiffValidationError::BadHunkRange { line, .. }
            | DiffValidationError::BadLinePrefix { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Outcome of [`validate`]: `Ok(())` for a valid diff.
pub type ValidationResult = Result<(), DiffValidationError>;

/// Validate that `diff` is a syntactically well-formed unified diff.
///
/// Checks, in order: non-empty input, the first non-blank line opens with
/// `diff`, `---` or `+++`, every `@@` line has a `-<old> +<new>` range pair
/// between two `@@` delimiters, every other non-empty line has a diff prefix,
/// and at least one hunk exists. The first failure wins.
///
/// # Examples
///
/// ```
/// use devkit_difflens::{validate, DiffValidationError};
///
/// let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1 +1 @@\n-old\n+new\n";
/// assert!(validate(diff).is_ok());
///
/// assert_eq!(validate(""), Err(DiffValidationError::Empty));
/// assert_eq!(validate("--- a/f\n+++ b/f\n"), Err(DiffValidationError::NoHunks));
/// ```
pub fn validate(diff: &str) -> ValidationResult {
    if diff.is_empty() {
        return Err(DiffValidationError::Empty);
    }

    let first = diff.lines().map(str::trim).find(|l| !l.is_empty());
    match first {
        Some(line) if START_MARKERS.iter().any(|m| line.starts_with(m)) => {}
        _ => return Err(DiffValidationError::BadStart),
    }

    let mut has_hunk = false;
    for (idx, line) in diff.lines().enumerate() {
        let number = idx + 1;
        if line.starts_with("@@") {
            has_hunk = true;
            check_hunk_header(line, number)?;
        } else if !line.is_empty() && !LINE_PREFIXES.iter().any(|p| line.starts_with(p)) {
            return Err(DiffValidationError::BadLinePrefix {
                line: number,
                text: line.to_string(),
            });
        }
    }

    if !has_hunk {
        return Err(DiffValidationError::NoHunks);
    }
    Ok(())
}

fn check_hunk_header(line: &str, number: usize) -> ValidationResult {
    let malformed = || DiffValidationError::MalformedHunkHeader {
        line: number,
        text: line.to_string(),
    };

    let segments: Vec<&str> = line.split("@@").collect();
    if segments.len() < 3 {
        return Err(malformed());
    }

    let mut ranges = segments[1].split_whitespace();
    let (Some(old), Some(new)) = (ranges.next(), ranges.next()) else {
        return Err(malformed());
    };
    if !(old.starts_with('-') && new.starts_with('+')) {
        return Err(DiffValidationError::BadHunkRange {
            line: number,
            text: line.to_string(),
        });
    }
    Ok(())
}
