use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("queue item at {0:?} is not valid UTF-8")]
    InvalidItem(PathBuf),
}

/// Shared job queue holding attachment paths.
///
/// `size` is best-effort and may race with other consumers; `get` may therefore
/// return `Ok(None)` even right after a non-zero `size`.
pub trait JobQueue: Send + Sync {
    fn size(&self) -> Result<usize, QueueError>;
    fn get(&self) -> Result<Option<String>, QueueError>;
}

/// In-process FIFO queue.
///
/// Entries are `Option<String>` so a `None` can be queued to reproduce a consumer
/// seeing a non-zero depth but no item.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    items: Mutex<VecDeque<Option<String>>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, item: Option<String>) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(item);
    }

    pub fn add_path(&self, path: impl Into<String>) {
        self.add(Some(path.into()));
    }
}

impl<I: Into<String>> FromIterator<I> for InMemoryQueue {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            items: Mutex::new(iter.into_iter().map(|item| Some(item.into())).collect()),
        }
    }
}

impl JobQueue for InMemoryQueue {
    fn size(&self) -> Result<usize, QueueError> {
        Ok(self.items.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    fn get(&self) -> Result<Option<String>, QueueError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten())
    }
}
