// storefront_client/src/store.rs

//! Client-side persistent state: auth token, CSRF token, pending payment and cart.
//!
//! The raw key/value layer is the [`ClientStore`] trait, so the browser's storage
//! can be swapped for memory (tests) or a JSON file (console). [`SessionStore`]
//! is the typed view the rest of the crate depends on.

use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{CartItem, PendingTransaction};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const CSRF_TOKEN_KEY: &str = "csrfToken";
pub const PENDING_TRANSACTION_KEY: &str = "pendingTransaction";
pub const CART_KEY: &str = "cart";

/// String key/value storage. Writes of a single key are atomic.
pub trait ClientStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: String) -> StorefrontResult<()>;
  fn remove(&self, key: &str) -> StorefrontResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ClientStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.read().get(key).cloned()
  }

  fn set(&self, key: &str, value: String) -> StorefrontResult<()> {
    self.entries.write().insert(key.to_string(), value);
    Ok(())
  }

  fn remove(&self, key: &str) -> StorefrontResult<()> {
    self.entries.write().remove(key);
    Ok(())
  }
}

/// A JSON file holding every key. Each write replaces the file through a
/// temporary sibling and a rename, so a crash never leaves half a record.
#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
  entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
  pub fn open(path: impl AsRef<Path>) -> StorefrontResult<Self> {
    let path = path.as_ref().to_path_buf();
    let entries = match fs::read_to_string(&path) {
      Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
      Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
        StorefrontError::Storage(format!("corrupt session file {}: {}", path.display(), e))
      })?,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
      Err(e) => return Err(StorefrontError::Storage(format!("{}: {}", path.display(), e))),
    };
    debug!(path = %path.display(), keys = entries.len(), "Session file opened.");
    Ok(Self {
      path,
      entries: RwLock::new(entries),
    })
  }

  fn persist(&self, entries: &BTreeMap<String, String>) -> StorefrontResult<()> {
    let io_err = |e: std::io::Error| StorefrontError::Storage(format!("{}: {}", self.path.display(), e));
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_vec_pretty(entries).map_err(|e| StorefrontError::Storage(e.to_string()))?;
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, &self.path).map_err(io_err)
  }
}

impl ClientStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.read().get(key).cloned()
  }

  // On a failed write the entry is restored, so memory matches the file.
  fn set(&self, key: &str, value: String) -> StorefrontResult<()> {
    let mut entries = self.entries.write();
    let previous = entries.insert(key.to_string(), value);
    self.persist(&entries).inspect_err(|_| restore(&mut entries, key, previous))
  }

  fn remove(&self, key: &str) -> StorefrontResult<()> {
    let mut entries = self.entries.write();
    if let Some(previous) = entries.remove(key) {
      self.persist(&entries).inspect_err(|_| restore(&mut entries, key, Some(previous)))?;
    }
    Ok(())
  }
}

fn restore(entries: &mut BTreeMap<String, String>, key: &str, previous: Option<String>) {
  match previous {
    Some(value) => entries.insert(key.to_string(), value),
    None => entries.remove(key),
  };
}

/// Typed access to the client store. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
  inner: Arc<dyn ClientStore>,
}

impl std::fmt::Debug for SessionStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionStore")
      .field("has_token", &self.auth_token().is_some())
      .field("has_pending_transaction", &self.inner.get(PENDING_TRANSACTION_KEY).is_some())
      .finish()
  }
}

impl SessionStore {
  pub fn new(inner: Arc<dyn ClientStore>) -> Self {
    Self { inner }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::new()))
  }

  pub fn auth_token(&self) -> Option<String> {
    self.inner.get(TOKEN_KEY).filter(|t| !t.is_empty())
  }

  pub fn set_auth_token(&self, token: &str) -> StorefrontResult<()> {
    self.inner.set(TOKEN_KEY, token.to_string())
  }

  pub fn csrf_token(&self) -> Option<String> {
    self.inner.get(CSRF_TOKEN_KEY).filter(|t| !t.is_empty())
  }

  pub fn set_csrf_token(&self, token: &str) -> StorefrontResult<()> {
    self.inner.set(CSRF_TOKEN_KEY, token.to_string())
  }

  pub fn clear_csrf_token(&self) -> StorefrontResult<()> {
    self.inner.remove(CSRF_TOKEN_KEY)
  }

  /// Drops everything tied to the signed-in session.
  pub fn clear_auth(&self) -> StorefrontResult<()> {
    self.inner.remove(TOKEN_KEY)?;
    self.inner.remove(CSRF_TOKEN_KEY)
  }

  /// A record that no longer parses is discarded rather than surfaced.
  pub fn pending_transaction(&self) -> Option<PendingTransaction> {
    let raw = self.inner.get(PENDING_TRANSACTION_KEY)?;
    match serde_json::from_str(&raw) {
      Ok(pending) => Some(pending),
      Err(e) => {
        warn!(error = %e, "Discarding unreadable pending transaction record.");
        if let Err(remove_err) = self.inner.remove(PENDING_TRANSACTION_KEY) {
          warn!(error = %remove_err, "Failed to remove unreadable pending transaction record.");
        }
        None
      }
    }
  }

  pub fn save_pending_transaction(&self, pending: &PendingTransaction) -> StorefrontResult<()> {
    let raw = serde_json::to_string(pending).map_err(|e| StorefrontError::Storage(e.to_string()))?;
    self.inner.set(PENDING_TRANSACTION_KEY, raw)
  }

  pub fn clear_pending_transaction(&self) -> StorefrontResult<()> {
    self.inner.remove(PENDING_TRANSACTION_KEY)
  }

  pub fn cart(&self) -> Vec<CartItem> {
    self
      .inner
      .get(CART_KEY)
      .and_then(|raw| match serde_json::from_str(&raw) {
        Ok(items) => Some(items),
        Err(e) => {
          warn!(error = %e, "Ignoring unreadable cart record.");
          None
        }
      })
      .unwrap_or_default()
  }

  pub fn save_cart(&self, items: &[CartItem]) -> StorefrontResult<()> {
    let raw = serde_json::to_string(items).map_err(|e| StorefrontError::Storage(e.to_string()))?;
    self.inner.set(CART_KEY, raw)
  }

  pub fn clear_cart(&self) -> StorefrontResult<()> {
    self.inner.remove(CART_KEY)
  }
}
