//! Download facility backed by libcurl: one GET per request, written to
//! `<dir>/<filename>.part` and renamed into place on success.
//!
//! Colliding filenames are made unique (`Book (1).pdf`) rather than
//! overwritten, both against files already on disk and against other
//! requests still in flight on the same host.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::host::{DownloadHost, DownloadId, DownloadRequest, HostError};
use crate::sanitize::is_filesystem_safe;

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Upper bound on ` (n)` suffixes tried for one target.
const MAX_UNIQUE_ATTEMPTS: u32 = 1000;

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Joins a `/`-separated relative filename onto `dir`, refusing anything
/// that would escape it or that the sanitizer would not have produced.
pub fn resolve_target(dir: &Path, filename: &str) -> Result<PathBuf> {
    let relative = Path::new(filename);
    let unsafe_component = relative.components().any(|c| match c {
        Component::Normal(part) => !part.to_str().is_some_and(is_filesystem_safe),
        _ => true,
    });
    if filename.is_empty() || unsafe_component {
        anyhow::bail!("refusing unsafe download filename {:?}", filename);
    }
    Ok(dir.join(relative))
}

/// `Book.pdf` -> `Book (n).pdf`; `n == 0` returns the path unchanged.
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

/// Saves downloads under a base directory.
#[derive(Debug)]
pub struct CurlDownloadHost {
    dir: PathBuf,
    next_id: AtomicU64,
    in_flight: Mutex<HashSet<PathBuf>>,
}

/// A final path claimed by one in-flight request; released on drop.
struct Reservation<'a> {
    host: &'a CurlDownloadHost,
    path: PathBuf,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.host.claimed().remove(&self.path);
    }
}

impl CurlDownloadHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: AtomicU64::new(1),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn claimed(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Picks the first of `path`, `path (1)`, ... that is neither on disk
    /// (final or `.part`) nor claimed by another request, and claims it.
    fn reserve(&self, path: &Path) -> Result<Reservation<'_>> {
        let mut claimed = self.claimed();
        for n in 0..MAX_UNIQUE_ATTEMPTS {
            let candidate = numbered_path(path, n);
            if claimed.contains(&candidate)
                || candidate.exists()
                || temp_path(&candidate).exists()
            {
                continue;
            }
            claimed.insert(candidate.clone());
            return Ok(Reservation {
                host: self,
                path: candidate,
            });
        }
        anyhow::bail!("no free filename for {}", path.display())
    }

    fn fetch_to(&self, request: &DownloadRequest) -> Result<(PathBuf, u64)> {
        let wanted = resolve_target(&self.dir, &request.filename)?;
        if let Some(parent) = wanted.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let reservation = self.reserve(&wanted)?;
        let final_path = reservation.path.clone();
        let part = temp_path(&final_path);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&part)
            .with_context(|| format!("create {}", part.display()))?;
        let written = match get_into(&request.url, &mut file, &part) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&part);
                return Err(e);
            }
        };
        drop(file);
        if final_path.exists() {
            let _ = fs::remove_file(&part);
            anyhow::bail!("{} appeared during download", final_path.display());
        }
        fs::rename(&part, &final_path)
            .with_context(|| format!("rename {} -> {}", part.display(), final_path.display()))?;
        drop(reservation);
        if final_path != wanted {
            tracing::info!(
                requested = %wanted.display(),
                saved = %final_path.display(),
                "filename taken, saved under a numbered name"
            );
        }
        Ok((final_path, written))
    }
}

impl DownloadHost for CurlDownloadHost {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadId, HostError> {
        let (path, bytes) = self.fetch_to(request)?;
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(%id, path = %path.display(), bytes, "download complete");
        Ok(id)
    }
}

/// GETs `url` into `file` (opened at `path`). Returns the number of bytes written.
fn get_into(url: &str, file: &mut File, path: &Path) -> Result<u64> {
    let mut written = 0u64;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.low_speed_limit(1024).map_err(|e| anyhow::anyhow!("curl: {}", e))?;
    easy.low_speed_time(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        let performed = transfer.perform();
        drop(transfer);
        if let Some(e) = write_error {
            return Err(e).with_context(|| format!("write {}", path.display()));
        }
        performed.context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    file.sync_all().context("sync download")?;
    Ok(written)
}
