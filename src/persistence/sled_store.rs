//! Persistence layer backed by `sled`
//!
//! Values live in a dedicated `pending_topics` tree. Every `save` is flushed
//! before returning so the on-disk snapshot never lags behind the queue.

use sled::{Db, Tree};

use super::KeyValueStore;
use crate::utils::Result;

const TREE_NAME: &str = "pending_topics";

#[derive(Clone)]
pub struct SledStore {
    db: Db,
    tree: Tree,
}

impl SledStore {
    /// Open or create a sled database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self { db, tree })
    }
}

impl KeyValueStore for SledStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.tree.insert(key.as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.tree.get(key.as_bytes())?.map(|value| value.to_vec()))
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("was_recovered", &self.db.was_recovered())
            .finish()
    }
}
