use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use engine_logging::engine_debug;
use tempfile::NamedTempFile;

use crate::queue::{JobQueue, QueueError};

/// Extension of pending job files.
pub const JOB_EXTENSION: &str = "job";

/// Directory-backed job queue.
///
/// Each pending job is a `*.job` file whose contents are one attachment path.
/// Several worker processes may share a spool directory: whichever consumer
/// manages to remove a job file owns that job.
#[derive(Debug)]
pub struct SpoolDirQueue {
    dir: PathBuf,
    seq: AtomicU64,
}

impl SpoolDirQueue {
    /// Opens (creating if needed) the spool directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| QueueError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Adds a job. The file appears under its final name only once fully written.
    pub fn enqueue(&self, attachment: &str) -> Result<PathBuf, QueueError> {
        let io_err = |source: io::Error| QueueError::Io {
            path: self.dir.clone(),
            source,
        };
        let target = self.dir.join(self.next_job_name());
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(attachment.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(target)
    }

    fn next_job_name(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!(
            "{nanos:024}-{pid}-{seq:06}.{JOB_EXTENSION}",
            pid = std::process::id()
        )
    }

    /// Pending job files, oldest name first.
    fn pending(&self) -> Result<Vec<PathBuf>, QueueError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| QueueError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut jobs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_job_file(path))
            .collect();
        jobs.sort();
        Ok(jobs)
    }
}

fn is_job_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(JOB_EXTENSION) && path.is_file()
}

impl JobQueue for SpoolDirQueue {
    fn size(&self) -> Result<usize, QueueError> {
        Ok(self.pending()?.len())
    }

    fn get(&self) -> Result<Option<String>, QueueError> {
        for job in self.pending()? {
            let bytes = match fs::read(&job) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(QueueError::Io { path: job, source }),
            };
            match fs::remove_file(&job) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    engine_debug!("Job {:?} was claimed by another consumer", job);
                    continue;
                }
                Err(source) => return Err(QueueError::Io { path: job, source }),
            }
            // The job is ours now; an unreadable payload is dropped with it.
            return match String::from_utf8(bytes) {
                Ok(text) => Ok(Some(text.trim().to_string())),
                Err(_) => Err(QueueError::InvalidItem(job)),
            };
        }
        Ok(None)
    }
}
