#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::IndexKey;

#[cfg(feature = "std")]
pub(crate) type KeyMap<V> = HashMap<IndexKey, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<V> = BTreeMap<IndexKey, V>;
