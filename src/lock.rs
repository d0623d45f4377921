//! Advisory lock implemented as a marker file next to the guarded path.
//!
//! Only cooperating processes respect it. A marker left behind by a killed
//! process is not expired automatically and has to be removed by hand.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// `<path>.lock`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// A held lock. The marker file is removed when this is dropped.
#[derive(Debug)]
pub struct FileLock {
    marker: PathBuf,
}

impl FileLock {
    /// Create the marker for `path`, retrying every `retry` until `timeout`
    /// has elapsed. Not reentrant: acquiring twice in one process waits for
    /// the full timeout.
    pub fn acquire(path: &Path, timeout: Duration, retry: Duration) -> Result<Self> {
        let marker = lock_path(path);
        let start = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&marker) {
                Ok(_) => {
                    debug!(path = %path.display(), "acquired lock");
                    return Ok(Self { marker });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(source) => {
                    return Err(Error::Lock {
                        path: marker,
                        source,
                    })
                }
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(Error::LockTimeout {
                    path: path.to_path_buf(),
                    waited: timeout,
                });
            }
            thread::sleep(retry.min(timeout - waited));
        }
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.marker) {
            Ok(()) => debug!(marker = %self.marker.display(), "released lock"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(marker = %self.marker.display(), error = %e, "failed to remove lock file"),
        }
    }
}
