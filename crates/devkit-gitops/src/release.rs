//! Version bumps, changelogs and dependency refreshes.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use devkit_core::{DevkitError, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::executor::{run_checked, VcsExecutor};
use crate::fs::atomic_write;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("version regex compiles"));

/// Which semver component to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Major,
    Minor,
    Patch,
}

impl FromStr for Bump {
    type Err = DevkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(Bump::Major),
            "minor" => Ok(Bump::Minor),
            "patch" => Ok(Bump::Patch),
            other => Err(DevkitError::InvalidInput(format!(
                "unknown bump '{other}', expected major, minor or patch"
            ))),
        }
    }
}

/// A `major.minor.patch` triple.
///
/// # Examples
///
/// ```
/// use devkit_gitops::release::{Bump, Version};
///
/// let v: Version = "1.4.2".parse().unwrap();
/// assert_eq!(v.bump(Bump::Minor).unwrap().to_string(), "1.5.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// The next version; lower components reset to zero.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Parse`] when the incremented component would
    /// not fit in a `u64`.
    pub fn bump(self, bump: Bump) -> Result<Self> {
        let out_of_range = || DevkitError::Parse(format!("version '{self}' out of range"));
        let next = |n: u64| n.checked_add(1).ok_or_else(out_of_range);
        Ok(match bump {
            Bump::Major => Self {
                major: next(self.major)?,
                minor: 0,
                patch: 0,
            },
            Bump::Minor => Self {
                minor: next(self.minor)?,
                patch: 0,
                ..self
            },
            Bump::Patch => Self {
                patch: next(self.patch)?,
                ..self
            },
        })
    }

    /// First version-looking substring of `text` and its byte range.
    fn find(text: &str) -> Result<Option<(Self, Range<usize>)>> {
        let Some(caps) = VERSION_RE.captures(text) else {
            return Ok(None);
        };
        let component = |i: usize| -> Result<u64> {
            caps[i]
                .parse()
                .map_err(|_| DevkitError::Parse(format!("version '{}' out of range", &caps[0])))
        };
        let version = Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        };
        let range = caps.get(0).map_or(0..0, |m| m.range());
        Ok(Some((version, range)))
    }
}

impl FromStr for Version {
    type Err = DevkitError;

    fn from_str(s: &str) -> Result<Self> {
        match Version::find(s)? {
            Some((version, _)) => Ok(version),
            None => Err(DevkitError::Parse(format!("'{s}' is not a version"))),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outcome of [`bump_version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBump {
    /// The file that was rewritten.
    pub file: PathBuf,
    pub previous: Version,
    pub current: Version,
}

/// Bump the version recorded in the first candidate file that has one.
///
/// `files` are tried in order, relative to `root`. The first
/// `major.minor.patch` occurrence in the chosen file is replaced and the
/// rest of the file is left as it was.
///
/// # Errors
///
/// Returns [`DevkitError::FileNotFound`] when none of the candidates exist,
/// [`DevkitError::Parse`] when none of them holds a version, or an I/O error
/// from reading or rewriting the file.
pub fn bump_version(root: &Path, files: &[String], bump: Bump) -> Result<VersionBump> {
    let mut any_present = false;
    for name in files {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        any_present = true;

        let content = std::fs::read_to_string(&path)?;
        let Some((previous, range)) = Version::find(&content)? else {
            debug!(path = %path.display(), "no version string");
            continue;
        };
        let current = previous.bump(bump)?;

        let mut updated = content;
        updated.replace_range(range, &current.to_string());
        atomic_write(&path, &updated)?;
        info!(path = %path.display(), %previous, %current, "bumped version");
        return Ok(VersionBump {
            file: path,
            previous,
            current,
        });
    }

    if any_present {
        Err(DevkitError::Parse(format!(
            "no version string found in {}",
            files.join(", ")
        )))
    } else {
        Err(DevkitError::FileNotFound(root.to_path_buf()))
    }
}

/// Changelog for the commits in `from..to`.
///
/// # Errors
///
/// Returns [`DevkitError::Git`] when either ref is unknown.
pub fn generate_changelog(exec: &dyn VcsExecutor, from: &str, to: &str) -> Result<String> {
    let range = format!("{from}..{to}");
    let output = run_checked(exec, &["git", "log", &range, "--pretty=format:%s"], None)?;
    Ok(render_changelog(output.stdout.lines()))
}

/// Group commit subjects into markdown sections.
///
/// Subjects starting with `feat` go under Features, `fix` or `bug` under
/// Bug Fixes and everything else under Other Changes, matched
/// case-insensitively. Empty sections are left out.
///
/// # Examples
///
/// ```
/// use devkit_gitops::release::render_changelog;
///
/// let log = render_changelog(["feat: dark mode", "Fix crash", "docs"]);
/// assert_eq!(
///     log,
///     "### Features\n- feat: dark mode\n\n### Bug Fixes\n- Fix crash\n\n### Other Changes\n- docs\n"
/// );
/// ```
pub fn render_changelog<'a>(subjects: impl IntoIterator<Item = &'a str>) -> String {
    let mut features = Vec::new();
    let mut fixes = Vec::new();
    let mut others = Vec::new();

    for subject in subjects.into_iter().filter(|s| !s.is_empty()) {
        let lower = subject.to_lowercase();
        if lower.starts_with("feat") {
            features.push(subject);
        } else if lower.starts_with("fix") || lower.starts_with("bug") {
            fixes.push(subject);
        } else {
            others.push(subject);
        }
    }

    let mut lines: Vec<String> = Vec::new();
    for (title, items) in [
        ("Features", features),
        ("Bug Fixes", fixes),
        ("Other Changes", others),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(format!("### {title}"));
        lines.extend(items.iter().map(|s| format!("- {s}")));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// One package ecosystem [`update_dependencies`] knows how to refresh.
struct Ecosystem {
    manifest: &'static str,
    label: &'static str,
    check: &'static [&'static str],
    update: &'static [&'static str],
}

const ECOSYSTEMS: [Ecosystem; 2] = [
    Ecosystem {
        manifest: "package.json",
        label: "npm",
        check: &["npm", "outdated"],
        update: &["npm", "update"],
    },
    Ecosystem {
        manifest: "requirements.txt",
        label: "pip",
        check: &["pip", "list", "--outdated"],
        update: &["pip", "install", "-r", "requirements.txt", "--upgrade"],
    },
];

/// Refresh npm and pip dependencies for the manifests present in `root`.
///
/// `exec` must run commands inside `root`. For each manifest, the outdated
/// listing runs first and the update follows if the listing could be run.
/// Returns whether every attempted update succeeded, and one message per
/// ecosystem touched.
pub fn update_dependencies(exec: &dyn VcsExecutor, root: &Path) -> (bool, Vec<String>) {
    let mut success = true;
    let mut messages = Vec::new();

    for eco in &ECOSYSTEMS {
        if !root.join(eco.manifest).is_file() {
            continue;
        }
        match exec.run(eco.check) {
            Ok(listing) => debug!(tool = eco.label, outdated = %listing.stdout.trim(), "checked"),
            Err(err) => {
                warn!(tool = eco.label, %err, "could not check for outdated packages");
                messages.push(format!("Failed to update {} packages", eco.label));
                success = false;
                continue;
            }
        }
        match run_checked(exec, eco.update, None) {
            Ok(_) => messages.push(format!("Updated {} packages", eco.label)),
            Err(err) => {
                warn!(tool = eco.label, %err, "update failed");
                messages.push(format!("Failed to update {} packages", eco.label));
                success = false;
            }
        }
    }

    (success, messages)
}
