use std::collections::HashMap;
use std::sync::Arc;

/// Handle of an encoded image registered in a [`BitmapRegistry`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct BitmapId(pub u32);

/// Encoded images that symbol styles refer to by [`BitmapId`].
///
/// The registry stores encoded bytes only; decoding happens once per symbol appearance and the
/// result lives in the renderer's symbol cache.
#[derive(Clone, Debug, Default)]
pub struct BitmapRegistry {
    next_id: u32,
    entries: HashMap<BitmapId, Arc<[u8]>>,
}

impl BitmapRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under a fresh id.
    pub fn register(&mut self, bytes: impl Into<Arc<[u8]>>) -> BitmapId {
        while self.entries.contains_key(&BitmapId(self.next_id)) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = BitmapId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(id, bytes.into());
        id
    }

    /// Register encoded bytes under a caller-chosen id, replacing any previous entry.
    pub fn register_with_id(&mut self, id: BitmapId, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(id, bytes.into());
    }

    /// Encoded bytes for `id`.
    pub fn get(&self, id: BitmapId) -> Option<&Arc<[u8]>> {
        self.entries.get(&id)
    }

    /// Remove an entry, returning its bytes.
    pub fn unregister(&mut self, id: BitmapId) -> Option<Arc<[u8]>> {
        self.entries.remove(&id)
    }

    /// Number of registered bitmaps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
