use alloc::string::String;
use alloc::sync::Arc;

use virtual_scroller::{
    InitialAnchor, ItemId, Positioning, RendererOptions, RestorationAnchor, TriggerCause,
    ZoneCallback,
};

use crate::FocusableSlot;

/// Maps a caller item to its list identity.
pub type IdentityFn<T> = Arc<dyn Fn(&T) -> ItemId + Send + Sync>;
/// Optional ordering key attached to each entry.
pub type SortIndexFn<T> = Arc<dyn Fn(&T) -> i64 + Send + Sync>;
/// Draws one item. The slot receives whether the drawn content can take keyboard focus.
pub type ItemRenderer<T, R> = Arc<dyn Fn(&T, &mut FocusableSlot) -> R + Send + Sync>;
/// Draws a synthetic entry (header, footer, empty-list placeholder).
pub type StaticRenderer<R> = Arc<dyn Fn() -> R + Send + Sync>;
pub type PositionCallback = Arc<dyn Fn(&Positioning) + Send + Sync>;
pub type NotifyCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration for [`crate::VirtualScroller`].
///
/// Cheap to clone: items and callbacks are `Arc`s, and changes are detected with
/// `Arc::ptr_eq`, so reuse the same `Arc` for anything that did not change.
pub struct VirtualScrollerOptions<T, R> {
    /// Scopes the height cache and the restored position.
    pub cache_key: String,
    pub items: Arc<[T]>,
    pub identity_function: IdentityFn<T>,
    pub sort_index_function: Option<SortIndexFn<T>>,
    pub renderer: ItemRenderer<T, R>,
    pub header: Option<StaticRenderer<R>>,
    pub footer: Option<StaticRenderer<R>>,
    pub no_items_renderer: Option<StaticRenderer<R>>,

    pub assumed_item_height: f64,
    /// `onNearStart` band, as a multiple of the viewport height.
    pub near_start_proximity_ratio: f64,
    /// `onNearEnd` band, as a multiple of the viewport height.
    pub near_end_proximity_ratio: f64,
    pub minimum_offscreen_to_viewport_ratio: f64,
    pub preferred_offscreen_to_viewport_ratio: f64,
    pub has_new_content_at_bottom: bool,
    pub without_headroom: bool,
    pub center_initial_anchor: bool,
    pub pin_to_newest_when_at_newest: bool,
    /// Item to start at when no saved position applies.
    pub initial_anchor: Option<RestorationAnchor>,

    pub on_at_start: Option<ZoneCallback>,
    pub on_near_start: Option<ZoneCallback>,
    pub on_near_end: Option<ZoneCallback>,
    pub on_at_end: Option<ZoneCallback>,
    pub on_items_rendered: Option<PositionCallback>,
    pub on_position_restored: Option<NotifyCallback>,
    pub on_scroll_end: Option<NotifyCallback>,
    pub on_keyboard_refresh: Option<NotifyCallback>,

    /// Engine settings with no wrapper-level field (timings, device pixel ratio, follow item,
    /// idle callbacks...). The fields above take precedence over their engine counterparts.
    pub engine: RendererOptions,
}

impl<T, R> Clone for VirtualScrollerOptions<T, R> {
    fn clone(&self) -> Self {
        Self {
            cache_key: self.cache_key.clone(),
            items: Arc::clone(&self.items),
            identity_function: Arc::clone(&self.identity_function),
            sort_index_function: self.sort_index_function.clone(),
            renderer: Arc::clone(&self.renderer),
            header: self.header.clone(),
            footer: self.footer.clone(),
            no_items_renderer: self.no_items_renderer.clone(),
            assumed_item_height: self.assumed_item_height,
            near_start_proximity_ratio: self.near_start_proximity_ratio,
            near_end_proximity_ratio: self.near_end_proximity_ratio,
            minimum_offscreen_to_viewport_ratio: self.minimum_offscreen_to_viewport_ratio,
            preferred_offscreen_to_viewport_ratio: self.preferred_offscreen_to_viewport_ratio,
            has_new_content_at_bottom: self.has_new_content_at_bottom,
            without_headroom: self.without_headroom,
            center_initial_anchor: self.center_initial_anchor,
            pin_to_newest_when_at_newest: self.pin_to_newest_when_at_newest,
            initial_anchor: self.initial_anchor.clone(),
            on_at_start: self.on_at_start.clone(),
            on_near_start: self.on_near_start.clone(),
            on_near_end: self.on_near_end.clone(),
            on_at_end: self.on_at_end.clone(),
            on_items_rendered: self.on_items_rendered.clone(),
            on_position_restored: self.on_position_restored.clone(),
            on_scroll_end: self.on_scroll_end.clone(),
            on_keyboard_refresh: self.on_keyboard_refresh.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<T, R> core::fmt::Debug for VirtualScrollerOptions<T, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScrollerOptions")
            .field("cache_key", &self.cache_key)
            .field("items_len", &self.items.len())
            .field("has_header", &self.header.is_some())
            .field("has_footer", &self.footer.is_some())
            .field("assumed_item_height", &self.assumed_item_height)
            .field("near_start_proximity_ratio", &self.near_start_proximity_ratio)
            .field("near_end_proximity_ratio", &self.near_end_proximity_ratio)
            .field("has_new_content_at_bottom", &self.has_new_content_at_bottom)
            .field("without_headroom", &self.without_headroom)
            .field("initial_anchor", &self.initial_anchor)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl<T, R> VirtualScrollerOptions<T, R> {
    pub fn new(
        cache_key: impl Into<String>,
        items: impl Into<Arc<[T]>>,
        identity_function: impl Fn(&T) -> ItemId + Send + Sync + 'static,
        renderer: impl Fn(&T, &mut FocusableSlot) -> R + Send + Sync + 'static,
    ) -> Self {
        let engine = RendererOptions::default();
        Self {
            cache_key: cache_key.into(),
            items: items.into(),
            identity_function: Arc::new(identity_function),
            sort_index_function: None,
            renderer: Arc::new(renderer),
            header: None,
            footer: None,
            no_items_renderer: None,
            assumed_item_height: engine.assumed_item_height,
            near_start_proximity_ratio: 0.25,
            near_end_proximity_ratio: 1.75,
            minimum_offscreen_to_viewport_ratio: engine.minimum_offscreen_to_viewport_ratio,
            preferred_offscreen_to_viewport_ratio: engine.preferred_offscreen_to_viewport_ratio,
            has_new_content_at_bottom: false,
            without_headroom: false,
            center_initial_anchor: false,
            pin_to_newest_when_at_newest: false,
            initial_anchor: None,
            on_at_start: None,
            on_near_start: None,
            on_near_end: None,
            on_at_end: None,
            on_items_rendered: None,
            on_position_restored: None,
            on_scroll_end: None,
            on_keyboard_refresh: None,
            engine,
        }
    }

    pub fn with_items(mut self, items: impl Into<Arc<[T]>>) -> Self {
        self.items = items.into();
        self
    }

    pub fn with_sort_index_function(
        mut self,
        f: impl Fn(&T) -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.sort_index_function = Some(Arc::new(f));
        self
    }

    pub fn with_header(mut self, f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.header = Some(Arc::new(f));
        self
    }

    pub fn with_footer(mut self, f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.footer = Some(Arc::new(f));
        self
    }

    pub fn with_no_items_renderer(mut self, f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.no_items_renderer = Some(Arc::new(f));
        self
    }

    pub fn with_assumed_item_height(mut self, height: f64) -> Self {
        self.assumed_item_height = height;
        self
    }

    pub fn with_proximity_ratios(mut self, near_start: f64, near_end: f64) -> Self {
        self.near_start_proximity_ratio = near_start;
        self.near_end_proximity_ratio = near_end;
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

    pub fn with_initial_anchor(mut self, anchor: Option<RestorationAnchor>) -> Self {
        self.initial_anchor = anchor;
        self
    }

    pub fn on_at_start(mut self, f: impl Fn(TriggerCause) + Send + Sync + 'static) -> Self {
        self.on_at_start = Some(Arc::new(f));
        self
    }

    pub fn on_near_start(mut self, f: impl Fn(TriggerCause) + Send + Sync + 'static) -> Self {
        self.on_near_start = Some(Arc::new(f));
        self
    }

    pub fn on_near_end(mut self, f: impl Fn(TriggerCause) + Send + Sync + 'static) -> Self {
        self.on_near_end = Some(Arc::new(f));
        self
    }

    pub fn on_at_end(mut self, f: impl Fn(TriggerCause) + Send + Sync + 'static) -> Self {
        self.on_at_end = Some(Arc::new(f));
        self
    }

    pub fn on_items_rendered(mut self, f: impl Fn(&Positioning) + Send + Sync + 'static) -> Self {
        self.on_items_rendered = Some(Arc::new(f));
        self
    }

    pub fn on_position_restored(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_position_restored = Some(Arc::new(f));
        self
    }

    pub fn on_scroll_end(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_scroll_end = Some(Arc::new(f));
        self
    }

    pub fn on_keyboard_refresh(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_keyboard_refresh = Some(Arc::new(f));
        self
    }

    pub fn with_engine_options(mut self, engine: RendererOptions) -> Self {
        self.engine = engine;
        self
    }

    /// Engine options for the current settings, starting at `initial_anchor`.
    pub(crate) fn renderer_options(
        &self,
        initial_anchor: Option<InitialAnchor>,
    ) -> RendererOptions {
        let mut options = self.engine.clone();
        options.cache_key = self.cache_key.clone();
        options.assumed_item_height = self.assumed_item_height;
        options.minimum_offscreen_to_viewport_ratio = self.minimum_offscreen_to_viewport_ratio;
        options.preferred_offscreen_to_viewport_ratio = self.preferred_offscreen_to_viewport_ratio;
        options.has_new_content_at_bottom = self.has_new_content_at_bottom;
        options.without_headroom = self.without_headroom;
        options.center_initial_anchor = self.center_initial_anchor;
        options.pin_to_newest_when_at_newest = self.pin_to_newest_when_at_newest;
        options.initial_anchor = initial_anchor;
        options
    }
}
