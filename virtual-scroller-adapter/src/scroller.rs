use alloc::collections::BTreeSet;
use alloc::sync::Arc;
use alloc::vec::Vec;

use virtual_scroller::{
    DataItem, EdgeProximity, HeightCache, InitialAnchor, ItemId, Positioning, RendererEvent,
    RestorationAnchor, Throttle, TransitionHint, TriggerCause, Viewport, ViewportEvent,
    VirtualScrollerRenderer, Zone, ZoneCallback, ZoneCondition,
};

use crate::list::same_arc;
use crate::{
    CustomLocation, Entry, ListBuilder, MemoryPositionStore, PositionStore,
    VirtualScrollerOptions,
};

const KEYBOARD_REFRESH_THROTTLE_MS: u64 = 1000;
// "At" an edge means within this many px of it.
const EDGE_THRESHOLD: f64 = 5.0;

const AT_START: usize = 0;
const NEAR_START: usize = 1;
const NEAR_END: usize = 2;
const AT_END: usize = 3;

/// Filled in by an item renderer to report whether the drawn content can take keyboard focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusableSlot(Option<bool>);

impl FocusableSlot {
    pub fn set(&mut self, focusable: bool) {
        self.0 = Some(focusable);
    }

    pub fn get(&self) -> Option<bool> {
        self.0
    }
}

/// One drawn entry, positioned in list coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell<R> {
    pub id: ItemId,
    pub entry: Entry,
    pub offset: f64,
    /// `false` until the entry has been measured; draw it transparent.
    pub visible: bool,
    pub content: R,
}

/// Result of [`VirtualScroller::render`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutput<R> {
    /// The item list is empty; holds the placeholder, if one is configured.
    Empty(Option<R>),
    Cells(Vec<Cell<R>>),
}

/// Wraps a [`VirtualScrollerRenderer`] with the list-level workflows hosts usually need:
/// - memoized conversion of caller items (plus header/footer) into the engine list
/// - edge-proximity callbacks (`on_at_start`, `on_near_start`, `on_near_end`, `on_at_end`)
/// - scroll-position persistence through a [`CustomLocation`]
/// - keyboard focus navigation
///
/// Like the renderer, it holds no UI objects. Hosts forward the same lifecycle and viewport
/// notifications to it and draw what [`Self::render`] returns.
pub struct VirtualScroller<T, R, V, S = MemoryPositionStore> {
    options: VirtualScrollerOptions<T, R>,
    renderer: VirtualScrollerRenderer<Entry, V>,
    list_builder: ListBuilder<T>,
    edge_proximity: EdgeProximity,
    location: CustomLocation<S>,
    restoration_anchor: Option<RestorationAnchor>,
    keyboard_refresh: Throttle,
    is_modal: bool,
    mounted: bool,
    focus_requests: Vec<ItemId>,
}

impl<T, R, V: core::fmt::Debug, S: core::fmt::Debug> core::fmt::Debug
    for VirtualScroller<T, R, V, S>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualScroller")
            .field("options", &self.options)
            .field("renderer", &self.renderer)
            .field("location", &self.location)
            .field("restoration_anchor", &self.restoration_anchor)
            .field("is_modal", &self.is_modal)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl<T, R, V: Viewport> VirtualScroller<T, R, V> {
    /// Creates a scroller persisting its position in a fresh in-memory location.
    pub fn new(options: VirtualScrollerOptions<T, R>, viewport: V) -> Self {
        Self::with_location(options, viewport, CustomLocation::default())
    }
}

impl<T, R, V: Viewport, S: PositionStore> VirtualScroller<T, R, V, S> {
    /// Creates a scroller that restores from (and saves to) `location`.
    pub fn with_location(
        options: VirtualScrollerOptions<T, R>,
        viewport: V,
        mut location: CustomLocation<S>,
    ) -> Self {
        let restoration_anchor = load_stored_position(&mut location, &options);
        let mut list_builder = ListBuilder::new();
        let list = build_list(&mut list_builder, &options);
        let initial_anchor = initial_anchor(&options, restoration_anchor.as_ref());
        let renderer =
            VirtualScrollerRenderer::new(options.renderer_options(initial_anchor), viewport)
                .with_list(list);
        let edge_proximity = EdgeProximity::new(edge_zones(&options));

        Self {
            options,
            renderer,
            list_builder,
            edge_proximity,
            location,
            restoration_anchor,
            keyboard_refresh: Throttle::new(KEYBOARD_REFRESH_THROTTLE_MS),
            is_modal: false,
            mounted: false,
            focus_requests: Vec::new(),
        }
    }

    /// Uses `cache` for measured heights, e.g. one kept from a previous scroller.
    pub fn with_height_cache(mut self, cache: HeightCache) -> Self {
        self.renderer = self.renderer.with_height_cache(cache);
        self
    }

    pub fn options(&self) -> &VirtualScrollerOptions<T, R> {
        &self.options
    }

    pub fn renderer(&self) -> &VirtualScrollerRenderer<Entry, V> {
        &self.renderer
    }

    /// Direct engine access. Events the engine emits are dispatched on the next call into the
    /// scroller.
    pub fn renderer_mut(&mut self) -> &mut VirtualScrollerRenderer<Entry, V> {
        &mut self.renderer
    }

    pub fn viewport(&self) -> &V {
        self.renderer.viewport()
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        self.renderer.viewport_mut()
    }

    /// The engine list: header, items, then footer.
    pub fn list(&self) -> &[DataItem<Entry>] {
        self.renderer.list()
    }

    pub fn location(&self) -> &CustomLocation<S> {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut CustomLocation<S> {
        &mut self.location
    }

    /// Replaces the location. It is read on the next cache-key change.
    pub fn set_location(&mut self, location: CustomLocation<S>) -> CustomLocation<S> {
        core::mem::replace(&mut self.location, location)
    }

    /// The saved anchor chosen for the current cache key, if any.
    pub fn restoration_anchor(&self) -> Option<&RestorationAnchor> {
        self.restoration_anchor.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Applies new options.
    ///
    /// The engine list is rebuilt only when items, identity/sort callbacks, header or footer
    /// changed. A new `cache_key` reloads the stored position and remounts the list.
    pub fn set_options(&mut self, options: VirtualScrollerOptions<T, R>, now_ms: u64) {
        let cache_key_changed = self.options.cache_key != options.cache_key;
        self.update_zones(&options);
        self.options = options;

        if cache_key_changed {
            vdebug!(
                cache_key = self.options.cache_key.as_str(),
                "VirtualScroller: cache key changed"
            );
            self.restoration_anchor = load_stored_position(&mut self.location, &self.options);
        }
        let list = build_list(&mut self.list_builder, &self.options);
        self.renderer.set_list(list);
        let anchor = initial_anchor(&self.options, self.restoration_anchor.as_ref());
        self.renderer.set_options(self.options.renderer_options(anchor));

        if self.mounted {
            self.sync_renderer_mount(now_ms);
            if cache_key_changed {
                self.notify_position_restored();
            }
        }
        self.dispatch_events();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(
        &mut self,
        now_ms: u64,
        f: impl FnOnce(&mut VirtualScrollerOptions<T, R>),
    ) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next, now_ms);
    }

    pub fn set_items(&mut self, items: impl Into<Arc<[T]>>, now_ms: u64) {
        let items = items.into();
        self.update_options(now_ms, |options| options.items = items);
    }

    fn update_zones(&mut self, next: &VirtualScrollerOptions<T, R>) {
        let prev = &self.options;
        let callbacks = [
            (AT_START, &prev.on_at_start, &next.on_at_start),
            (NEAR_START, &prev.on_near_start, &next.on_near_start),
            (NEAR_END, &prev.on_near_end, &next.on_near_end),
            (AT_END, &prev.on_at_end, &next.on_at_end),
        ];
        for (index, old, new) in callbacks {
            if same_arc(old, new) {
                continue;
            }
            if let Some(zone) = self.edge_proximity.zone_mut(index) {
                zone.callback = zone_callback(new);
            }
        }
        if prev.near_start_proximity_ratio != next.near_start_proximity_ratio {
            if let Some(zone) = self.edge_proximity.zone_mut(NEAR_START) {
                zone.condition = ZoneCondition::NearTopRatio(next.near_start_proximity_ratio);
            }
        }
        if prev.near_end_proximity_ratio != next.near_end_proximity_ratio {
            if let Some(zone) = self.edge_proximity.zone_mut(NEAR_END) {
                zone.condition = ZoneCondition::NearBottomRatio(next.near_end_proximity_ratio);
            }
        }
    }

    /// Attaches to the host. The engine itself is mounted only while there are items.
    pub fn on_mount(&mut self, now_ms: u64) {
        vdebug!(
            restore = self.restoration_anchor.is_some(),
            "VirtualScroller::on_mount"
        );
        self.mounted = true;
        self.sync_renderer_mount(now_ms);
        self.notify_position_restored();
        self.dispatch_events();
    }

    pub fn on_unmount(&mut self) {
        self.mounted = false;
        self.keyboard_refresh.cancel();
        if self.renderer.is_mounted() {
            self.renderer.on_unmount();
        }
    }

    fn sync_renderer_mount(&mut self, now_ms: u64) {
        let has_items = !self.options.items.is_empty();
        if has_items && !self.renderer.is_mounted() {
            self.renderer.on_mount(now_ms);
        } else if !has_items && self.renderer.is_mounted() {
            self.renderer.on_unmount();
        }
    }

    pub fn on_viewport_event(&mut self, now_ms: u64, event: ViewportEvent) {
        self.renderer.on_viewport_event(now_ms, event);
        self.dispatch_events();
    }

    /// Advances timers and runs the work due at `now_ms`. Call once per frame.
    pub fn tick(&mut self, now_ms: u64) {
        if self.keyboard_refresh.poll(now_ms) {
            self.run_keyboard_refresh();
        }
        self.renderer.tick(now_ms);
        self.dispatch_events();
    }

    pub fn on_idle(&mut self, now_ms: u64) {
        self.renderer.on_idle(now_ms);
        self.dispatch_events();
    }

    pub fn next_deadline(&self) -> Option<u64> {
        match (self.renderer.next_deadline(), self.keyboard_refresh.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.renderer.needs_frame() || self.renderer.has_pending_events()
    }

    /// Draws the materialized entries and reconciles the engine's cell registry with them.
    ///
    /// Entries that left the slice are unmounted, new ones are mounted, and the focusability
    /// reported by the item renderer is forwarded to the engine.
    pub fn render(&mut self) -> RenderOutput<R> {
        if self.options.items.is_empty() {
            return RenderOutput::Empty(self.options.no_items_renderer.as_ref().map(|f| f()));
        }

        let mut cells = Vec::new();
        let mut focusability = Vec::new();
        for cell in self.renderer.rendered_cells() {
            let mut slot = FocusableSlot::default();
            let entry = cell.item.data;
            let content = match entry {
                Entry::Header => self.options.header.as_ref().map(|f| f()),
                Entry::Footer => self.options.footer.as_ref().map(|f| f()),
                Entry::Item(i) => self
                    .options
                    .items
                    .get(i)
                    .map(|item| (self.options.renderer)(item, &mut slot)),
            };
            let Some(content) = content else {
                continue;
            };
            if let Some(focusable) = slot.get() {
                focusability.push((cell.item.id.clone(), focusable));
            }
            cells.push(Cell {
                id: cell.item.id.clone(),
                entry,
                offset: cell.offset,
                visible: cell.visible,
                content,
            });
        }

        let drawn: BTreeSet<&str> = cells.iter().map(|cell| cell.id.as_str()).collect();
        for id in self.renderer.mounted_item_ids() {
            if !drawn.contains(id.as_str()) {
                self.renderer.on_item_unmounted(&id);
            }
        }
        for id in &drawn {
            if !self.renderer.is_item_mounted(id) {
                self.renderer.on_item_mounted(id);
            }
        }
        for (id, focusable) in focusability {
            self.renderer.set_item_focusable(&id, focusable);
        }
        vtrace!(cells = cells.len(), "VirtualScroller::render");
        RenderOutput::Cells(cells)
    }

    pub fn on_item_height_changed(&mut self, id: &str, height: f64) {
        self.renderer.on_item_height_changed(id, height);
        self.dispatch_events();
    }

    pub fn on_animation_started(&mut self, id: &str, hint: Option<TransitionHint>, now_ms: u64) {
        self.renderer.on_animation_started(id, hint, now_ms);
    }

    pub fn on_animation_ended(&mut self, id: &str) {
        self.renderer.on_animation_ended(id);
        self.dispatch_events();
    }

    /// Items the host should move keyboard focus to, oldest first.
    pub fn take_focus_requests(&mut self) -> Vec<ItemId> {
        core::mem::take(&mut self.focus_requests)
    }

    pub fn is_at_newest(&self) -> bool {
        !self.renderer.is_mounted() || self.renderer.is_at_newest()
    }

    pub fn scroll_to_newest(&mut self, update: bool) {
        if self.renderer.is_mounted() {
            self.renderer.scroll_to_newest(update);
            self.dispatch_events();
        }
    }

    pub fn adjust_focus_by(&mut self, by: isize) {
        if self.renderer.is_mounted() {
            self.renderer.adjust_focus_by(by);
            self.dispatch_events();
        }
    }

    /// Keyboard shortcuts are ignored while a modal covers the list.
    pub fn set_modal(&mut self, is_modal: bool) {
        self.is_modal = is_modal;
    }

    pub fn is_modal(&self) -> bool {
        self.is_modal
    }

    pub fn handle_keyboard_focus_next(&mut self) {
        if !self.is_modal {
            self.adjust_focus_by(1);
        }
    }

    pub fn handle_keyboard_focus_previous(&mut self) {
        if !self.is_modal {
            self.adjust_focus_by(-1);
        }
    }

    /// Runs `on_keyboard_refresh` at most once per second; a burst ends with one trailing run.
    pub fn handle_keyboard_refresh(&mut self, now_ms: u64) {
        if self.keyboard_refresh.request(now_ms) {
            self.run_keyboard_refresh();
        }
    }

    fn run_keyboard_refresh(&self) {
        if self.is_modal {
            return;
        }
        if let Some(callback) = &self.options.on_keyboard_refresh {
            callback();
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.renderer.drain_events() {
            match event {
                RendererEvent::PositionUpdate(positioning) => {
                    self.handle_position_update(&positioning);
                }
                RendererEvent::ScrollEnd => {
                    if let Some(callback) = &self.options.on_scroll_end {
                        callback();
                    }
                }
                RendererEvent::FocusChanged(id) => self.focus_requests.push(id),
            }
        }
    }

    fn handle_position_update(&mut self, positioning: &Positioning) {
        self.edge_proximity.handle_positioning_update(positioning);
        if let Some(callback) = &self.options.on_items_rendered {
            callback(positioning);
        }
        self.preserve_position();
    }

    /// Saves the anchors currently in view to the location.
    pub fn preserve_position(&mut self) {
        let anchors = self.renderer.get_anchors();
        self.location.save_position(anchors);
    }

    fn notify_position_restored(&self) {
        if let Some(callback) = &self.options.on_position_restored {
            callback();
        }
    }
}

fn build_list<T, R>(
    builder: &mut ListBuilder<T>,
    options: &VirtualScrollerOptions<T, R>,
) -> Arc<[DataItem<Entry>]> {
    builder.build(
        &options.items,
        &options.identity_function,
        options.sort_index_function.as_ref(),
        options.header.is_some(),
        options.footer.is_some(),
    )
}

/// Reads the saved anchors and picks the one to restore: a focused anchor still in the list,
/// otherwise the first anchor still in the list.
fn load_stored_position<T, R, S: PositionStore>(
    location: &mut CustomLocation<S>,
    options: &VirtualScrollerOptions<T, R>,
) -> Option<RestorationAnchor> {
    let saved = location.saved_position();
    if saved.is_some() {
        location.claim_scroll_restoration();
    }
    let anchors = saved.unwrap_or_default();
    if anchors.is_empty() {
        return None;
    }

    let ids: BTreeSet<ItemId> = options
        .items
        .iter()
        .map(|item| (options.identity_function)(item))
        .collect();
    let anchor = anchors
        .iter()
        .find(|anchor| anchor.was_focused && ids.contains(&anchor.id))
        .or_else(|| anchors.iter().find(|anchor| ids.contains(&anchor.id)))
        .cloned();
    vdebug!(
        saved = anchors.len(),
        restored = ?anchor.as_ref().map(|a| a.id.as_str()),
        "loaded stored position"
    );
    anchor
}

fn initial_anchor<T, R>(
    options: &VirtualScrollerOptions<T, R>,
    restoration_anchor: Option<&RestorationAnchor>,
) -> Option<InitialAnchor> {
    match restoration_anchor {
        Some(anchor) => Some(InitialAnchor::Restore(anchor.clone())),
        None => options
            .initial_anchor
            .as_ref()
            .map(|anchor| InitialAnchor::Focused {
                id: anchor.id.clone(),
            }),
    }
}

fn edge_zones<T, R>(options: &VirtualScrollerOptions<T, R>) -> [Zone; 4] {
    [
        Zone {
            condition: ZoneCondition::NearTop(EDGE_THRESHOLD),
            callback: zone_callback(&options.on_at_start),
        },
        Zone {
            condition: ZoneCondition::NearTopRatio(options.near_start_proximity_ratio),
            callback: zone_callback(&options.on_near_start),
        },
        Zone {
            condition: ZoneCondition::NearBottomRatio(options.near_end_proximity_ratio),
            callback: zone_callback(&options.on_near_end),
        },
        Zone {
            condition: ZoneCondition::NearBottom(EDGE_THRESHOLD),
            callback: zone_callback(&options.on_at_end),
        },
    ]
}

fn zone_callback(callback: &Option<ZoneCallback>) -> ZoneCallback {
    match callback {
        Some(callback) => Arc::clone(callback),
        None => Arc::new(|_: TriggerCause| {}),
    }
}
