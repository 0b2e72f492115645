use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::ItemId;
use crate::key::{IdMap, KeyMap};

/// Measured item heights, scoped per cache key.
///
/// Switching the active scope never clears the others, so a list instance that comes back
/// finds its measurements intact. By default scopes are retained forever; `max_scopes` bounds
/// the number of retained scopes and evicts the least recently activated one.
#[derive(Clone, Debug, Default)]
pub struct HeightCache {
    scopes: KeyMap<String, IdMap<f64>>,
    active: String,
    // Least recently activated first.
    recency: Vec<String>,
    max_scopes: Option<usize>,
}

impl HeightCache {
    pub fn new(scope: impl Into<String>) -> Self {
        let mut cache = Self::default();
        cache.activate(scope);
        cache
    }

    pub fn with_max_scopes(mut self, max_scopes: Option<usize>) -> Self {
        self.max_scopes = max_scopes.map(|n| n.max(1));
        self.evict();
        self
    }

    pub fn max_scopes(&self) -> Option<usize> {
        self.max_scopes
    }

    pub fn active_scope(&self) -> &str {
        &self.active
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    /// Makes `scope` the active scope, creating it when needed.
    pub fn activate(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        self.recency.retain(|s| *s != scope);
        self.recency.push(scope.clone());
        self.scopes.entry(scope.clone()).or_default();
        self.active = scope;
        self.evict();
    }

    fn evict(&mut self) {
        let Some(max) = self.max_scopes else {
            return;
        };
        while self.scopes.len() > max {
            let Some(pos) = self.recency.iter().position(|s| *s != self.active) else {
                return;
            };
            let victim = self.recency.remove(pos);
            vdebug!(scope = victim.as_str(), "evicting height cache scope");
            self.scopes.remove(&victim);
        }
    }

    fn active_map(&self) -> Option<&IdMap<f64>> {
        self.scopes.get(&self.active)
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.active_map().and_then(|m| m.get(id).copied())
    }

    pub fn get_in(&self, scope: &str, id: &str) -> Option<f64> {
        self.scopes.get(scope).and_then(|m| m.get(id).copied())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.active_map().is_some_and(|m| m.contains_key(id))
    }

    /// Records a measured height in the active scope.
    ///
    /// Returns `false` (and leaves the cache untouched) for negative or non-finite heights.
    pub fn insert(&mut self, id: &str, height: f64) -> bool {
        if !height.is_finite() || height < 0.0 {
            vwarn!(id, height, "HeightCache: rejected invalid height");
            return false;
        }
        let scope = self.active.clone();
        self.scopes
            .entry(scope)
            .or_default()
            .insert(ItemId::from(id), height);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<f64> {
        let scope = self.active.clone();
        self.scopes.get_mut(&scope).and_then(|m| m.remove(id))
    }

    /// Number of measured items in the active scope.
    pub fn len(&self) -> usize {
        self.active_map().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every measurement of `scope` (the scope itself stays registered).
    pub fn clear_scope(&mut self, scope: &str) {
        if let Some(m) = self.scopes.get_mut(scope) {
            m.clear();
        }
    }

    /// Exports the active scope's measurements (useful for persistence).
    pub fn export_active(&self) -> Vec<(ItemId, f64)> {
        self.active_map()
            .map(|m| m.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default()
    }
}
