use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use devkit_core::Result;
use tracing::debug;

/// Replace `path` with `contents` in one step.
///
/// The bytes go to a sibling temp file which is synced and then renamed over
/// the target, so a failed write leaves the original file as it was.
pub(crate) fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_sibling(path);
    let written = write_synced(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    debug!(path = %path.display(), bytes = contents.len(), "rewrote file");
    Ok(())
}

fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.devkit-tmp"))
}
