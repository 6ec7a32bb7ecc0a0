//! Line-level model of unified diff text.

use std::fmt;

use serde::Serialize;

/// File name reported for findings that appear before any file header.
pub const UNKNOWN_FILE: &str = "(unknown)";

/// Classification of a single diff line, decided by its prefix.
///
/// # Examples
///
/// ```
/// use devkit_difflens::line::DiffLineKind;
///
/// assert_eq!(DiffLineKind::of("+++ b/src/lib.rs"), DiffLineKind::NewFileMarker);
/// assert_eq!(DiffLineKind::of("+let x = 1;"), DiffLineKind::Addition);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffLineKind {
    /// `diff --git a/<old> b/<new>`
    FileHeader,
    /// `--- <old>`
    OldFileMarker,
    /// `+++ <new>`
    NewFileMarker,
    /// `@@ -<o> +<n> @@`
    HunkHeader,
    /// Unchanged line, prefixed with a space.
    Context,
    /// Added line, prefixed with `+`.
    Addition,
    /// Removed line, prefixed with `-`.
    Deletion,
    /// `\ No newline at end of file`
    NoNewlineMarker,
    /// Blank line.
    Empty,
    /// Anything else (`index`, `new file mode`, stray text).
    Other,
}

impl DiffLineKind {
    /// Classify `line` by prefix. Marker prefixes win over content prefixes,
    /// so `+++ b/x` is a [`NewFileMarker`](Self::NewFileMarker), never an addition.
    pub fn of(line: &str) -> Self {
        if line.starts_with("diff --git") {
            DiffLineKind::FileHeader
        } else if line.starts_with("---") {
            DiffLineKind::OldFileMarker
        } else if line.starts_with("+++") {
            DiffLineKind::NewFileMarker
        } else if line.starts_with("@@") {
            DiffLineKind::HunkHeader
        } else if line.starts_with('+') {
            DiffLineKind::Addition
        } else if line.starts_with('-') {
            DiffLineKind::Deletion
        } else if line.starts_with(' ') {
            DiffLineKind::Context
        } else if line.starts_with('\\') {
            DiffLineKind::NoNewlineMarker
        } else if line.is_empty() {
            DiffLineKind::Empty
        } else {
            DiffLineKind::Other
        }
    }
}

/// A borrowed diff line with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLine<'a> {
    /// Prefix-based classification.
    pub kind: DiffLineKind,
    /// The full line, prefix included.
    pub text: &'a str,
}

impl<'a> DiffLine<'a> {
    /// Classify a single line.
    pub fn new(text: &'a str) -> Self {
        Self {
            kind: DiffLineKind::of(text),
            text,
        }
    }

    /// Content after the one-character `+`/`-`/` ` prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_difflens::line::DiffLine;
    ///
    /// assert_eq!(DiffLine::new("+  indented").body(), "  indented");
    /// ```
    pub fn body(&self) -> &'a str {
        match self.kind {
            DiffLineKind::Addition | DiffLineKind::Deletion | DiffLineKind::Context => {
                &self.text[1..]
            }
            _ => self.text,
        }
    }

    /// Target path of a `diff --git` header, `None` for any other line.
    pub fn header_path(&self) -> Option<String> {
        (self.kind == DiffLineKind::FileHeader).then(|| header_path(self.text))
    }
}

/// Iterate the classified lines of a diff.
pub fn lines(diff: &str) -> impl Iterator<Item = DiffLine<'_>> {
    diff.lines().map(DiffLine::new)
}

/// Extract the file a `diff --git a/X b/Y` header refers to.
///
/// Takes the token after the last whitespace run and strips a leading `b/`.
/// Headers without the usual shape degrade to whatever the last token is.
///
/// # Examples
///
/// ```
/// use devkit_difflens::line::header_path;
///
/// assert_eq!(header_path("diff --git a/src/app.py b/src/app.py"), "src/app.py");
/// assert_eq!(header_path("diff --git a/old.rs b/build.rs"), "build.rs");
/// ```
pub fn header_path(header: &str) -> String {
    let token = header.split_whitespace().last().unwrap_or_default();
    token.strip_prefix("b/").unwrap_or(token).to_string()
}

/// Parsed `@@ -<oldStart>[,<oldLen>] +<newStart>[,<newLen>] @@` header.
///
/// Omitted lengths default to 1, as in unified diff output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkHeader {
    /// First line of the hunk in the old file.
    pub old_start: u32,
    /// Line count in the old file.
    pub old_len: u32,
    /// First line of the hunk in the new file.
    pub new_start: u32,
    /// Line count in the new file.
    pub new_len: u32,
}

impl HunkHeader {
    /// Parse a hunk header with numeric ranges.
    ///
    /// Returns `None` when the line is not a well-formed numeric header; the
    /// validator in [`crate::validate`] is deliberately more lenient.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_difflens::line::HunkHeader;
    ///
    /// let h = HunkHeader::parse("@@ -10,3 +12 @@ fn main()").unwrap();
    /// assert_eq!((h.old_start, h.old_len, h.new_start, h.new_len), (10, 3, 12, 1));
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let inner = line.strip_prefix("@@ ")?;
        let inner = &inner[..inner.find(" @@")?];
        let (old, new) = inner.split_once(' ')?;
        let (old_start, old_len) = parse_range(old.strip_prefix('-')?)?;
        let (new_start, new_len) = parse_range(new.strip_prefix('+')?)?;
        Some(Self {
            old_start,
            old_len,
            new_start,
            new_len,
        })
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// All numeric hunk headers in a diff, in order. Unparseable `@@` lines are skipped.
pub fn hunk_headers(diff: &str) -> Vec<HunkHeader> {
    lines(diff)
        .filter(|l| l.kind == DiffLineKind::HunkHeader)
        .filter_map(|l| HunkHeader::parse(l.text))
        .collect()
}
