use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::key::{IdMap, IdSet};
use crate::rect::snap_to_device_pixels;
use crate::schedule::{Debounce, FrameQueue, Throttle};
use crate::{
    Align, Anchor, DataItem, HeightCache, InitialAnchor, ItemId, Rectangle, RenderedCell,
    RendererEvent, RendererOptions, ScrollDirection, Slice, TransitionHint, Viewport,
    ViewportEvent,
};

mod focus;
mod layout;

pub use layout::{RenderCandidates, smooth_slice};

#[derive(Clone, Copy, Debug, Default)]
struct CellState {
    // Last reported height; `None` until the cell reports a non-zero height.
    height: Option<f64>,
    focusable: bool,
    animating_until: Option<u64>,
}

/// An anchor-based windowing engine for variable-height lists.
///
/// The renderer owns a [`Viewport`] and a list of [`DataItem`]s and decides which contiguous
/// slice of the list is materialized and where each materialized item sits. Measured heights
/// are cached per `cache_key`; the first on-screen item keeps its on-screen position while
/// heights above it change or items are prepended.
///
/// It holds no UI objects and owns no timers:
/// - the host forwards viewport notifications with [`Self::on_viewport_event`],
/// - reports cell lifecycle and height changes (`on_item_*`),
/// - calls [`Self::tick`] once per frame (and [`Self::on_idle`] when idle callbacks exist),
/// - then drains [`RendererEvent`]s and draws [`Self::rendered_cells`].
pub struct VirtualScrollerRenderer<T, V> {
    options: RendererOptions,
    viewport: V,
    list: Arc<[DataItem<T>]>,
    index_of: IdMap<usize>,

    heights: HeightCache,
    cells: IdMap<CellState>,
    pending_height_updates: IdSet,

    rendered_items: Vec<Anchor>,
    slice: Slice,
    list_height_with_headroom: f64,
    current_headroom: f64,
    should_animate: bool,
    transition: TransitionHint,

    mounted: bool,
    is_idle: bool,
    is_initial_anchoring: bool,
    is_fullscreen: bool,
    was_previously_at_newest_end: bool,
    // Set while the follow item keeps layouts pinned to the newest edge.
    following_newest: bool,
    has_user_changed_focus: bool,
    active_entry_id: Option<ItemId>,
    focus_newest_pending: bool,

    scroll_direction: Option<ScrollDirection>,
    previous_scroll_y: f64,

    now_ms: u64,
    frames: FrameQueue,
    update_throttle: Throttle,
    scroll_end: Debounce,
    settle: Debounce,

    events: Vec<RendererEvent>,
}

impl<T, V: fmt::Debug> fmt::Debug for VirtualScrollerRenderer<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualScrollerRenderer")
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("list_len", &self.list.len())
            .field("slice", &self.slice)
            .field("rendered_items", &self.rendered_items)
            .field("list_height_with_headroom", &self.list_height_with_headroom)
            .field("is_idle", &self.is_idle)
            .field("is_initial_anchoring", &self.is_initial_anchoring)
            .field("active_entry_id", &self.active_entry_id)
            .field("following_newest", &self.following_newest)
            .finish_non_exhaustive()
    }
}

impl<T, V: Viewport> VirtualScrollerRenderer<T, V> {
    pub fn new(options: RendererOptions, viewport: V) -> Self {
        vdebug!(
            cache_key = options.cache_key.as_str(),
            bottom = options.has_new_content_at_bottom,
            "VirtualScrollerRenderer::new"
        );
        let heights = HeightCache::new(options.cache_key.clone())
            .with_max_scopes(options.max_cached_scopes);
        let was_previously_at_newest_end = options.initial_anchor.is_none();
        Self {
            list: Arc::from(Vec::new()),
            index_of: IdMap::default(),
            heights,
            cells: IdMap::default(),
            pending_height_updates: IdSet::default(),
            rendered_items: Vec::new(),
            slice: Slice::default(),
            list_height_with_headroom: 0.0,
            current_headroom: 0.0,
            should_animate: false,
            transition: TransitionHint::DEFAULT,
            mounted: false,
            is_idle: true,
            is_initial_anchoring: false,
            is_fullscreen: false,
            was_previously_at_newest_end,
            following_newest: false,
            has_user_changed_focus: false,
            active_entry_id: None,
            focus_newest_pending: false,
            scroll_direction: None,
            previous_scroll_y: viewport.scroll_y(),
            now_ms: 0,
            frames: FrameQueue::default(),
            update_throttle: Throttle::new(options.update_throttle_ms),
            scroll_end: Debounce::new(options.scroll_end_delay_ms),
            settle: Debounce::new(options.settle_delay_ms),
            events: Vec::new(),
            options,
            viewport,
        }
    }

    /// Uses `cache` for measured heights (e.g. one shared by several list instances).
    ///
    /// The scope named by `options.cache_key` becomes active.
    pub fn with_height_cache(mut self, mut cache: HeightCache) -> Self {
        cache.activate(self.options.cache_key.clone());
        self.heights = cache;
        self
    }

    pub fn with_list(mut self, list: impl Into<Arc<[DataItem<T>]>>) -> Self {
        self.set_list(list);
        self
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Applies new options.
    ///
    /// A changed `cache_key` remounts the list against the new scope (using the new
    /// `initial_anchor`); anything else schedules a recomputation.
    pub fn set_options(&mut self, options: RendererOptions) {
        let cache_key_changed = self.options.cache_key != options.cache_key;
        let scopes_changed = self.options.max_cached_scopes != options.max_cached_scopes;
        self.update_throttle.set_wait_ms(options.update_throttle_ms);
        self.scroll_end.set_wait_ms(options.scroll_end_delay_ms);
        self.settle.set_wait_ms(options.settle_delay_ms);
        self.options = options;
        vtrace!(
            cache_key = self.options.cache_key.as_str(),
            cache_key_changed,
            "VirtualScrollerRenderer::set_options"
        );

        if scopes_changed {
            let heights = core::mem::take(&mut self.heights);
            self.heights = heights.with_max_scopes(self.options.max_cached_scopes);
        }
        if cache_key_changed && self.mounted {
            let key = self.options.cache_key.clone();
            let anchor = self.options.initial_anchor.clone();
            self.remount(key, anchor, self.now_ms);
        } else if cache_key_changed {
            self.heights.activate(self.options.cache_key.clone());
        } else if self.mounted {
            self.frames.request_critical();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut RendererOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Direct access to the viewport. Hosts that scroll it must still report the matching
    /// [`ViewportEvent`].
    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn list(&self) -> &[DataItem<T>] {
        &self.list
    }

    pub fn height_cache(&self) -> &HeightCache {
        &self.heights
    }

    pub fn height_cache_mut(&mut self) -> &mut HeightCache {
        &mut self.heights
    }

    pub fn slice(&self) -> Slice {
        self.slice
    }

    /// The materialized items in list order, with their list-coordinate offsets.
    pub fn rendered_anchors(&self) -> &[Anchor] {
        &self.rendered_items
    }

    /// Rendered items joined with their list entries; ids missing from the list are skipped.
    pub fn rendered_cells(&self) -> Vec<RenderedCell<'_, T>> {
        self.final_rendered()
            .map(|(item, anchor)| RenderedCell {
                item,
                offset: anchor.offset,
                visible: anchor.visible,
            })
            .collect()
    }

    pub fn list_height_with_headroom(&self) -> f64 {
        self.list_height_with_headroom
    }

    pub fn current_headroom(&self) -> f64 {
        self.current_headroom
    }

    /// Whether offset changes of the last layout should be animated.
    pub fn should_animate(&self) -> bool {
        self.should_animate
    }

    pub fn transition_hint(&self) -> TransitionHint {
        self.transition
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    pub fn is_initial_anchoring(&self) -> bool {
        self.is_initial_anchoring
    }

    /// `true` while fullscreen suspends recomputation.
    pub fn is_suspended(&self) -> bool {
        self.is_fullscreen
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        self.active_entry_id.as_deref()
    }

    pub fn has_user_changed_focus(&self) -> bool {
        self.has_user_changed_focus
    }

    /// Whether layouts stay pinned to the newest edge for the follow item.
    ///
    /// Starts when the list changes while the viewport is at the newest edge and ends with the
    /// next user scroll.
    pub fn is_following_newest(&self) -> bool {
        self.following_newest
    }

    /// Takes every event produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<RendererEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Height used for layout: the measured height or the assumed one, snapped to device
    /// pixels.
    pub fn height_for_id(&self, id: &str) -> f64 {
        let height = self
            .heights
            .get(id)
            .unwrap_or_else(|| self.options.sanitized_assumed_height());
        snap_to_device_pixels(height, self.options.device_pixel_ratio)
    }

    /// The viewport in list coordinates, or `None` while the list root is not laid out.
    pub fn relative_viewport_rect(&self) -> Option<Rectangle> {
        let root_top = self.viewport.root_top()?;
        Some(self.viewport.rect().translate_by(-root_top))
    }

    /// Replaces the list. Identity (`Arc::ptr_eq`) decides whether anything changed.
    pub fn set_list(&mut self, list: impl Into<Arc<[DataItem<T>]>>) {
        let list = list.into();
        if Arc::ptr_eq(&self.list, &list) {
            return;
        }
        self.index_of.clear();
        for (i, item) in list.iter().enumerate() {
            self.index_of.insert(item.id.clone(), i);
        }
        self.list = list;
        vtrace!(len = self.list.len(), "VirtualScrollerRenderer::set_list");
        if !self.mounted {
            return;
        }
        self.frames.request_critical();

        let follow = self
            .options
            .follow_item_id
            .as_deref()
            .is_some_and(|id| self.index_of.contains_key(id) && self.height_for_id(id) > 0.0);
        self.following_newest =
            self.was_previously_at_newest_end && follow && !self.options.center_initial_anchor;
        if self.following_newest {
            vdebug!("following newest edge");
            self.scroll_to_newest(false);
        }
    }

    /// Places the initial layout. Call once the viewport geometry is available.
    pub fn on_mount(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.mounted = true;
        self.previous_scroll_y = self.viewport.scroll_y();
        let rendered = self.initial_rendered_items();
        vdebug!(
            initial_items = rendered.len(),
            restore = self.options.initial_anchor.is_some(),
            "VirtualScrollerRenderer::on_mount"
        );
        if self.options.manual_scroll_restoration {
            self.scroll_viewport_by(-1.0);
        }
        self.is_initial_anchoring = true;

        if rendered.is_empty() {
            self.update();
            return;
        }

        self.rendered_items = rendered;
        self.should_animate = true;
        self.list_height_with_headroom = self.viewport.document_height();
        match self.options.initial_anchor.clone() {
            Some(InitialAnchor::Restore(anchor)) => {
                let correction = self.viewport_offset_correction();
                self.scroll_viewport_by(correction);
                if anchor.was_focused {
                    self.focus_item(&anchor.id, Align::Start);
                }
            }
            Some(InitialAnchor::Focused { id }) => {
                let align = if self.options.center_initial_anchor {
                    Align::Center
                } else {
                    Align::Start
                };
                self.focus_item(&id, align);
            }
            None => {}
        }
        // Let the host paint the initial cells before measuring them.
        self.frames.request_critical_after(2);
    }

    /// Switches to another cache scope and lays the list out from scratch.
    ///
    /// Measurements of the previous scope are retained.
    pub fn remount(
        &mut self,
        cache_key: impl Into<String>,
        initial_anchor: Option<InitialAnchor>,
        now_ms: u64,
    ) {
        let cache_key = cache_key.into();
        vdebug!(cache_key = cache_key.as_str(), "VirtualScrollerRenderer::remount");
        self.heights.activate(cache_key.clone());
        self.options.cache_key = cache_key;
        self.options.initial_anchor = initial_anchor;
        self.reset_layout_state();
        self.on_mount(now_ms);
    }

    /// Detaches from the host: cancels scheduled work and forgets mounted cells.
    pub fn on_unmount(&mut self) {
        vdebug!("VirtualScrollerRenderer::on_unmount");
        self.mounted = false;
        self.frames.clear();
        self.update_throttle.cancel();
        self.scroll_end.cancel();
        self.settle.cancel();
        self.focus_newest_pending = false;
        self.cells.clear();
        self.pending_height_updates.clear();
        self.transition = TransitionHint::DEFAULT;
    }

    fn reset_layout_state(&mut self) {
        self.on_unmount();
        self.rendered_items.clear();
        self.slice = Slice::default();
        self.list_height_with_headroom = 0.0;
        self.current_headroom = 0.0;
        self.should_animate = false;
        self.is_idle = true;
        self.is_initial_anchoring = false;
        self.was_previously_at_newest_end = self.options.initial_anchor.is_none();
        self.following_newest = false;
        self.has_user_changed_focus = false;
        self.active_entry_id = None;
        self.scroll_direction = None;
    }

    pub fn on_viewport_event(&mut self, now_ms: u64, event: ViewportEvent) {
        self.now_ms = now_ms;
        match event {
            ViewportEvent::Resize => self.request_throttled_update(now_ms),
            ViewportEvent::Scroll => self.handle_scroll(now_ms),
            ViewportEvent::ProgrammaticScroll(delta) => {
                self.previous_scroll_y += delta;
            }
            ViewportEvent::FullscreenEnter => {
                vdebug!("fullscreen: suspending updates");
                self.is_fullscreen = true;
            }
            ViewportEvent::FullscreenExit => {
                vdebug!("fullscreen: resuming updates");
                self.is_fullscreen = false;
                self.frames.request_critical();
            }
        }
    }

    fn handle_scroll(&mut self, now_ms: u64) {
        self.was_previously_at_newest_end = self.is_at_newest();
        self.following_newest = false;
        let scroll_y = self.viewport.scroll_y();
        if scroll_y > self.previous_scroll_y {
            self.scroll_direction = Some(ScrollDirection::Forward);
        } else if scroll_y < self.previous_scroll_y {
            self.scroll_direction = Some(ScrollDirection::Backward);
        }
        if self.is_initial_anchoring || scroll_y < 0.0 {
            return;
        }
        self.is_idle = false;
        self.scroll_end.request(now_ms);
        self.request_throttled_update(now_ms);
    }

    fn request_throttled_update(&mut self, now_ms: u64) {
        if self.update_throttle.request(now_ms) {
            self.frames.request_critical();
        }
    }

    fn finish_scroll(&mut self) {
        vtrace!("scroll end");
        self.previous_scroll_y = self.viewport.scroll_y();
        self.scroll_direction = None;
        self.is_idle = true;
        self.events.push(RendererEvent::ScrollEnd);
        self.frames.request_critical();
    }

    // Idle when the host has idle callbacks, otherwise next frame.
    fn schedule_update(&mut self) {
        if self.options.has_idle_callback {
            self.frames.request_idle();
        } else {
            self.frames.request_critical();
        }
    }

    /// Advances timers and runs the work due at `now_ms`. Call once per frame.
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.expire_animations(now_ms);
        if self.update_throttle.poll(now_ms) {
            self.frames.request_critical();
        }
        if self.scroll_end.poll(now_ms) {
            self.finish_scroll();
        }
        if self.settle.poll(now_ms) {
            self.schedule_update();
        }

        let critical = self.frames.take_frame();
        let idle = !self.options.has_idle_callback && self.frames.take_idle();
        if critical || idle {
            self.update();
        }
        if core::mem::take(&mut self.focus_newest_pending) {
            self.focus_newest_focusable();
        }
    }

    /// Runs idle-priority work. Only meaningful with `has_idle_callback`.
    pub fn on_idle(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        if self.frames.take_idle() {
            self.update();
        }
    }

    /// Earliest time a timer (debounce, throttle or animation TTL) becomes due.
    pub fn next_deadline(&self) -> Option<u64> {
        let animations = self.cells.values().filter_map(|c| c.animating_until).min();
        [
            self.update_throttle.deadline(),
            self.scroll_end.deadline(),
            self.settle.deadline(),
            animations,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Whether the next `tick` has frame work regardless of timers.
    pub fn needs_frame(&self) -> bool {
        !self.frames.is_empty() || self.focus_newest_pending
    }

    pub fn on_item_mounted(&mut self, id: &str) {
        self.cells.entry(ItemId::from(id)).or_default();
    }

    pub fn on_item_unmounted(&mut self, id: &str) {
        self.cells.remove(id);
        self.pending_height_updates.remove(id);
    }

    pub fn is_item_mounted(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    pub fn mounted_item_ids(&self) -> Vec<ItemId> {
        self.cells.keys().cloned().collect()
    }

    pub fn mounted_item_count(&self) -> usize {
        self.cells.len()
    }

    pub fn set_item_focusable(&mut self, id: &str, focusable: bool) {
        self.cells.entry(ItemId::from(id)).or_default().focusable = focusable;
    }

    /// Reports the current height of a mounted cell.
    ///
    /// A first report of 0 is ignored (the cell has not been laid out yet). Negative or
    /// non-finite heights are dropped.
    pub fn on_item_height_changed(&mut self, id: &str, height: f64) {
        if !height.is_finite() || height < 0.0 {
            vwarn!(id, height, "ignoring invalid height report");
            return;
        }
        let cell = self.cells.entry(ItemId::from(id)).or_default();
        if cell.height.is_none() && height == 0.0 {
            return;
        }
        cell.height = Some(height);
        let animating = cell.animating_until.is_some();
        if self.heights.get(id) == Some(height) {
            return;
        }
        if animating {
            self.frames.request_critical();
        } else {
            self.update_item_height(id);
        }
    }

    fn update_item_height(&mut self, id: &str) {
        self.pending_height_updates.insert(ItemId::from(id));
        let over_limit = self.pending_height_updates.len() > self.options.height_batch_limit;
        let touches_rendered = self.rendered_items.iter().any(|a| {
            self.heights.contains(&a.item_id) || self.pending_height_updates.contains(&a.item_id)
        });
        if over_limit || touches_rendered {
            vtrace!(pending = self.pending_height_updates.len(), "flushing height updates");
            self.update();
            self.pending_height_updates.clear();
        }
    }

    /// Marks a cell as animating; its height reports only schedule a recomputation until
    /// [`Self::on_animation_ended`] (or the TTL) fires.
    pub fn on_animation_started(&mut self, id: &str, hint: Option<TransitionHint>, now_ms: u64) {
        let until = now_ms.saturating_add(self.options.animation_ttl_ms);
        self.cells.entry(ItemId::from(id)).or_default().animating_until = Some(until);
        if let Some(hint) = hint {
            self.transition = hint;
        }
    }

    pub fn on_animation_ended(&mut self, id: &str) {
        let Some(cell) = self.cells.get_mut(id) else {
            return;
        };
        if cell.animating_until.take().is_none() {
            return;
        }
        let reported = cell.height;
        self.transition = TransitionHint::DEFAULT;
        if let Some(height) = reported {
            if self.heights.get(id) != Some(height) {
                self.update_item_height(id);
            }
        }
    }

    pub fn has_animations(&self) -> bool {
        self.cells.values().any(|c| c.animating_until.is_some())
    }

    fn expire_animations(&mut self, now_ms: u64) {
        let expired: Vec<ItemId> = self
            .cells
            .iter()
            .filter(|(_, c)| c.animating_until.is_some_and(|until| now_ms >= until))
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            vtrace!(id = id.as_str(), "animation TTL expired");
            self.on_animation_ended(&id);
        }
    }

    fn measure_heights(&mut self) {
        for (id, cell) in self.cells.iter() {
            if let Some(height) = cell.height {
                self.heights.insert(id, height);
            }
        }
    }

    fn scroll_viewport_by(&mut self, delta: f64) -> f64 {
        let applied = self.viewport.scroll_by(delta);
        self.previous_scroll_y += applied;
        applied
    }

    fn final_rendered(&self) -> impl Iterator<Item = (&DataItem<T>, &Anchor)> + '_ {
        self.rendered_items.iter().filter_map(move |anchor| {
            self.index_of
                .get(anchor.item_id.as_str())
                .and_then(|&i| self.list.get(i))
                .map(|item| (item, anchor))
        })
    }
}
