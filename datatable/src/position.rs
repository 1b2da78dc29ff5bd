use alloc::vec::Vec;

use crate::IndexKey;
use crate::key::KeyMap;

/// The visible rows, in display order.
///
/// Display position `p` is the row whose key is `keys[p]`; positions are always `0..len`.
#[derive(Clone, Debug, Default)]
pub struct PositionIndex {
    keys: Vec<IndexKey>,
    lookup: KeyMap<usize>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: Vec<IndexKey>) -> Self {
        let mut lookup = KeyMap::new();
        for (position, key) in keys.iter().enumerate() {
            lookup.insert(key.clone(), position);
        }
        Self { keys, lookup }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn key_at(&self, position: usize) -> Option<&IndexKey> {
        self.keys.get(position)
    }

    pub fn position_of(&self, key: &IndexKey) -> Option<usize> {
        self.lookup.get(key).copied()
    }
}

impl PartialEq for PositionIndex {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for PositionIndex {}
