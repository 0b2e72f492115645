use alloc::string::String;

#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

/// Caller-supplied identity of a list entry. Unique within one list.
pub type ItemId = String;

#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type IdSet = HashSet<ItemId>;
#[cfg(not(feature = "std"))]
pub(crate) type IdSet = BTreeSet<ItemId>;

pub(crate) type IdMap<V> = KeyMap<ItemId, V>;
