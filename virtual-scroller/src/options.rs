use alloc::string::String;

use crate::{InitialAnchor, ItemId};

/// Configuration for [`crate::VirtualScrollerRenderer`].
///
/// Fields are public so hosts can build the struct literally; the `with_*` helpers cover the
/// common knobs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RendererOptions {
    /// Scope for measured heights. Swapping it remounts the list against another scope.
    pub cache_key: String,
    /// Height used for items that have not been measured yet.
    pub assumed_item_height: f64,
    /// Band that must always be rendered, as a multiple of the viewport height per edge.
    pub minimum_offscreen_to_viewport_ratio: f64,
    /// Band rendered once the list is idle.
    pub preferred_offscreen_to_viewport_ratio: f64,
    /// The list grows at the bottom (chat-like). Newest content lives at the end.
    pub has_new_content_at_bottom: bool,
    pub without_headroom: bool,
    pub center_initial_anchor: bool,
    /// Stick to the newest edge while the viewport is already there.
    pub pin_to_newest_when_at_newest: bool,
    pub initial_anchor: Option<InitialAnchor>,
    /// Nudge the viewport by one pixel on mount so the host's own restoration cannot win.
    pub manual_scroll_restoration: bool,
    /// The host calls `on_idle` during idle periods; otherwise idle work runs on `tick`.
    pub has_idle_callback: bool,
    pub device_pixel_ratio: f64,
    /// Wait with normalization until scrolling stops (when the list overflows the viewport).
    pub defer_correction_while_scrolling: bool,
    /// Keep following the newest edge when this item is present (e.g. a typing indicator).
    pub follow_item_id: Option<ItemId>,
    pub scroll_end_delay_ms: u64,
    pub update_throttle_ms: u64,
    /// Delay before a deferred recomputation (slice expansion, pending normalization).
    pub settle_delay_ms: u64,
    /// Upper bound of a cell animation when its end is never reported.
    pub animation_ttl_ms: u64,
    /// Pending height reports that force a recomputation even with nothing measured.
    pub height_batch_limit: usize,
    /// A current slice at most this long is kept while it still covers the candidates.
    pub slice_keep_limit: usize,
    /// Pixel tolerance of the "at newest edge" test.
    pub newest_edge_tolerance: f64,
    /// Bound on retained height-cache scopes (`None` keeps all).
    pub max_cached_scopes: Option<usize>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            cache_key: String::new(),
            assumed_item_height: 400.0,
            minimum_offscreen_to_viewport_ratio: 0.5,
            preferred_offscreen_to_viewport_ratio: 2.5,
            has_new_content_at_bottom: false,
            without_headroom: false,
            center_initial_anchor: false,
            pin_to_newest_when_at_newest: false,
            initial_anchor: None,
            manual_scroll_restoration: false,
            has_idle_callback: false,
            device_pixel_ratio: 1.0,
            defer_correction_while_scrolling: false,
            follow_item_id: None,
            scroll_end_delay_ms: 200,
            update_throttle_ms: 100,
            settle_delay_ms: 250,
            animation_ttl_ms: 1000,
            height_batch_limit: 50,
            slice_keep_limit: 50,
            newest_edge_tolerance: 50.0,
            max_cached_scopes: None,
        }
    }
}

impl RendererOptions {
    pub fn new(cache_key: impl Into<String>) -> Self {
        Self {
            cache_key: cache_key.into(),
            ..Self::default()
        }
    }

    pub fn with_assumed_item_height(mut self, height: f64) -> Self {
        self.assumed_item_height = height;
        self
    }

    pub fn with_offscreen_ratios(mut self, minimum: f64, preferred: f64) -> Self {
        self.minimum_offscreen_to_viewport_ratio = minimum;
        self.preferred_offscreen_to_viewport_ratio = preferred;
        self
    }

    pub fn with_new_content_at_bottom(mut self, enabled: bool) -> Self {
        self.has_new_content_at_bottom = enabled;
        self
    }

    pub fn with_headroom(mut self, enabled: bool) -> Self {
        self.without_headroom = !enabled;
        self
    }

    pub fn with_center_initial_anchor(mut self, enabled: bool) -> Self {
        self.center_initial_anchor = enabled;
        self
    }

    pub fn with_pin_to_newest_when_at_newest(mut self, enabled: bool) -> Self {
        self.pin_to_newest_when_at_newest = enabled;
        self
    }

    pub fn with_initial_anchor(mut self, anchor: Option<InitialAnchor>) -> Self {
        self.initial_anchor = anchor;
        self
    }

    pub fn with_manual_scroll_restoration(mut self, enabled: bool) -> Self {
        self.manual_scroll_restoration = enabled;
        self
    }

    pub fn with_idle_callback(mut self, enabled: bool) -> Self {
        self.has_idle_callback = enabled;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_defer_correction_while_scrolling(mut self, enabled: bool) -> Self {
        self.defer_correction_while_scrolling = enabled;
        self
    }

    pub fn with_follow_item_id(mut self, id: Option<ItemId>) -> Self {
        self.follow_item_id = id;
        self
    }

    pub fn with_max_cached_scopes(mut self, max: Option<usize>) -> Self {
        self.max_cached_scopes = max;
        self
    }

    /// Scroll-end debounce, update throttle and settle delay.
    pub fn with_timings(mut self, scroll_end_ms: u64, throttle_ms: u64, settle_ms: u64) -> Self {
        self.scroll_end_delay_ms = scroll_end_ms;
        self.update_throttle_ms = throttle_ms;
        self.settle_delay_ms = settle_ms;
        self
    }

    pub(crate) fn sanitized_assumed_height(&self) -> f64 {
        if self.assumed_item_height.is_finite() && self.assumed_item_height >= 0.0 {
            self.assumed_item_height
        } else {
            0.0
        }
    }
}
