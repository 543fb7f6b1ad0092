//! Named save slots for boards.
//!
//! Backends only move JSON text. Encoding and validation happen in
//! [`write_document`] and [`read_document`], so every backend rejects the
//! same malformed input with the same [`DocumentError`].

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::{DocumentError, SceneDocument};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No saved board named {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Future returned by storage backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A backend holding one JSON text per slot name.
pub trait Storage: Send + Sync {
    /// Store `json` under `slot`, replacing what was there.
    fn put(&self, slot: &str, json: String) -> BoxFuture<'_, StorageResult<()>>;

    /// The text stored under `slot`, or `None` if the slot is empty.
    fn get(&self, slot: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;
}

/// Encode `document` and store it under `slot`.
pub async fn write_document(
    storage: &dyn Storage,
    slot: &str,
    document: &SceneDocument,
) -> StorageResult<()> {
    let json = document.to_json()?;
    storage.put(slot, json).await?;
    log::debug!("saved {} object(s) to slot {slot:?}", document.objects.len());
    Ok(())
}

/// Read and validate the document stored under `slot`.
pub async fn read_document(storage: &dyn Storage, slot: &str) -> StorageResult<SceneDocument> {
    let json = storage
        .get(slot)
        .await?
        .ok_or_else(|| StorageError::NotFound(slot.to_string()))?;
    let document = SceneDocument::from_json(&json)
        .inspect_err(|err| log::warn!("slot {slot:?} holds an unreadable board: {err}"))?;
    Ok(document)
}

/// Drive a storage future to completion on the current thread.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    struct Noop;

    impl Wake for Noop {
        fn wake(self: Arc<Self>) {}
    }

    let waker = Waker::from(Arc::new(Noop));
    let mut cx = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}
