//! Storage abstraction for persisted layouts.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::layout::{DashboardLayout, LayoutCodecError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<LayoutCodecError> for StorageError {
    fn from(err: LayoutCodecError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Who a layout belongs to.
///
/// Both parts come from the authorization layer in front of the store; the
/// store only uses them as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutOwner {
    pub tenant_id: String,
    pub user_id: String,
}

impl LayoutOwner {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for LayoutOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.user_id)
    }
}

/// The persisted record: `{ "id"?: string, "layout": string }`.
///
/// `layout` holds the JSON-encoded item array. Stores keep it verbatim and
/// never look inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub layout: String,
}

impl StoredLayout {
    /// Wrap a raw layout string under a fresh record id.
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            layout: layout.into(),
        }
    }

    /// Encode a layout, keeping `id` if the record already has one.
    pub fn encode(layout: &DashboardLayout, id: Option<String>) -> Result<Self, LayoutCodecError> {
        Ok(Self {
            id: id.or_else(|| Some(Uuid::new_v4().to_string())),
            layout: layout.to_wire()?,
        })
    }

    /// Decode the layout string.
    pub fn decode(&self) -> Result<DashboardLayout, LayoutCodecError> {
        DashboardLayout::from_wire(&self.layout)
    }
}

/// Per-owner layout persistence.
///
/// Implementations do no semantic checking: overlapping or unknown widgets
/// are stored as given.
pub trait LayoutStore: Send + Sync {
    /// Read the stored record, or `StorageError::NotFound`.
    fn read(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<StoredLayout>>;

    /// Replace the stored record.
    fn write(&self, owner: &LayoutOwner, layout: &StoredLayout) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove the stored record. Removing a missing record succeeds.
    fn delete(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<()>>;
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
