//! Crash-safe output files.

use anyhow::{Context, Result};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// An output file that only appears at its final path once committed.
///
/// Data is written to a temporary sibling file. [`commit`](Self::commit)
/// syncs it and atomically renames it over the target; dropping an
/// uncommitted `AtomicOutput` removes the temporary file, so a failed
/// encrypt or decrypt never leaves partial output behind.
pub struct AtomicOutput {
    path: PathBuf,
    tmp_path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl AtomicOutput {
    /// Creates the temporary file next to `path`.
    ///
    /// Creates parent directories if they don't exist.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = random_tmp_path(path)?;

        // securely create temp file (fail if exists)
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .context("failed to create temporary file")?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            file: Some(BufWriter::new(file)),
        })
    }

    /// Flushes, fsyncs and moves the temporary file into place.
    pub fn commit(mut self) -> Result<()> {
        let writer = self.file.take().context("output already committed")?;

        let file = match writer.into_inner() {
            Ok(file) => file,
            Err(e) => {
                let _ = fs::remove_file(&self.tmp_path);
                return Err(e.into_error().into());
            }
        };

        //fsync file, then atomic replace
        if let Err(e) = file
            .sync_all()
            .map_err(anyhow::Error::from)
            .and_then(|_| atomic_replace(&self.tmp_path, &self.path))
        {
            drop(file);
            let _ = fs::remove_file(&self.tmp_path);
            return Err(e);
        }

        // fsync directory
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }

        Ok(())
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(f) => f.write(buf),
            None => Err(io::Error::other("output already committed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicOutput {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Generates a unique temporary file path in the same directory.
///
/// Uses cryptographically secure random bytes to avoid name collisions.
/// Format: `filename.tmp.<randomhex>`
fn random_tmp_path(path: &Path) -> Result<PathBuf> {
    let mut buf = [0u8; 8]; // 64 bit entropy
    fill(&mut buf)?;

    let file_name = path
        .file_name()
        .context("output path has no file name")?
        .to_string_lossy();

    let tmp_name = format!("{}.tmp.{}", file_name, hex::encode(buf));

    Ok(path.with_file_name(tmp_name))
}

/// Atomically replaces the target file with the temporary file.
///
/// Uses Windows `ReplaceFileW` API with `REPLACEFILE_WRITE_THROUGH` flag
/// when the target exists; a plain rename otherwise.
#[cfg(target_os = "windows")]
fn atomic_replace(tmp_path: &Path, path: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    if !path.exists() {
        fs::rename(tmp_path, path)?;
        return Ok(());
    }

    let target_w = to_wide(path.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY:
    // - Strings are valid UTF-16 and null-terminated
    // - Pointers remain valid during the call
    // - Windows does not retain the pointers after return
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        let err = std::io::Error::last_os_error();
        return Err(err).context("atomic replace failed");
    }

    Ok(())
}

/// On Unix, `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(tmp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp_path, path)?;
    Ok(())
}
