use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use virtual_scroller::RestorationAnchor;

/// When a [`CustomLocation`] hands out its saved position.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocationConfig {
    /// Restore on every mount, not only on back/forward navigation.
    pub always_restore: bool,
    /// Store key of the saved position.
    pub key: String,
    /// The current navigation came from a history pop.
    pub from_pop: bool,
    /// Keep the saved position untouched by regular navigations.
    pub lock: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            always_restore: true,
            key: String::from("/home"),
            from_pop: true,
            lock: false,
        }
    }
}

impl LocationConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_always_restore(mut self, always_restore: bool) -> Self {
        self.always_restore = always_restore;
        self
    }

    pub fn with_from_pop(mut self, from_pop: bool) -> Self {
        self.from_pop = from_pop;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}

/// A persisted scroll position, tagged by who wrote it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SavedPosition {
    /// Anchors captured by the virtual scroller.
    Custom(Option<Vec<RestorationAnchor>>),
    /// A plain offset recorded by the host's default restoration. Never restored here.
    Environment { scroll_y: f64 },
}

/// Key/value persistence behind a [`CustomLocation`].
pub trait PositionStore {
    fn get(&self, key: &str) -> Option<SavedPosition>;
    fn set(&mut self, key: &str, position: SavedPosition);
}

/// An in-memory [`PositionStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryPositionStore {
    positions: BTreeMap<String, SavedPosition>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PositionStore for MemoryPositionStore {
    fn get(&self, key: &str) -> Option<SavedPosition> {
        self.positions.get(key).cloned()
    }

    fn set(&mut self, key: &str, position: SavedPosition) {
        self.positions.insert(String::from(key), position);
    }
}

/// Scroll-position persistence for one navigation entry.
///
/// Whoever restores a position calls [`Self::claim_scroll_restoration`] so the host's default
/// restoration stays out of the way. Claiming is idempotent.
#[derive(Clone, Debug, Default)]
pub struct CustomLocation<S = MemoryPositionStore> {
    claimed: bool,
    config: LocationConfig,
    store: S,
}

impl CustomLocation {
    pub fn new(config: LocationConfig) -> Self {
        Self::with_store(config, MemoryPositionStore::default())
    }
}

impl<S: PositionStore> CustomLocation<S> {
    pub fn with_store(config: LocationConfig, store: S) -> Self {
        Self {
            claimed: false,
            config,
            store,
        }
    }

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LocationConfig) {
        self.config = config;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn claim_scroll_restoration(&mut self) {
        self.claimed = true;
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// The saved anchors, if this navigation may restore and the store holds anchors.
    pub fn saved_position(&self) -> Option<Vec<RestorationAnchor>> {
        let config = &self.config;
        if !((config.always_restore && !config.lock) || config.from_pop) {
            return None;
        }
        match self.store.get(&config.key) {
            Some(SavedPosition::Custom(position)) => position,
            _ => None,
        }
    }

    pub fn save_position(&mut self, anchors: Vec<RestorationAnchor>) {
        self.store
            .set(&self.config.key, SavedPosition::Custom(Some(anchors)));
    }

    pub fn is_locked(&self) -> bool {
        self.config.lock && !self.config.from_pop
    }
}
