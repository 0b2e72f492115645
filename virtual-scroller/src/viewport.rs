use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::Rectangle;

/// What kind of scroll surface backs a [`Viewport`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewportKind {
    /// The document itself scrolls; its rect top is not part of the list-root offset.
    #[default]
    Window,
    /// A scrollable element nested in the document.
    Element,
}

/// A notification the host forwards to the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportEvent {
    /// The viewport rectangle or size changed.
    Resize,
    /// The user scrolled.
    Scroll,
    /// A programmatic scroll moved the surface by the given signed delta.
    ProgrammaticScroll(f64),
    FullscreenEnter,
    FullscreenExit,
}

/// The scrollable surface the engine lays items out against.
///
/// Coordinates are in the host's client space: `rect()` and `root_top()` must share an origin.
/// Scroll offsets are pixels scrolled from the origin.
pub trait Viewport {
    fn kind(&self) -> ViewportKind {
        ViewportKind::Window
    }

    /// The visible region.
    fn rect(&self) -> Rectangle;

    /// Space at the bottom of the document that overlays the viewport (e.g. a toolbar).
    fn offset_bottom(&self) -> f64 {
        0.0
    }

    fn scroll_y(&self) -> f64;

    /// Scrolls by `delta` and returns the delta actually applied.
    fn scroll_by(&mut self, delta: f64) -> f64;

    /// Scrolls to an absolute position and returns the delta actually applied.
    fn scroll_to(&mut self, x: f64, y: f64) -> f64;

    fn scroll_to_top(&mut self) -> f64 {
        self.scroll_to(0.0, 0.0)
    }

    fn scroll_to_bottom(&mut self) -> f64;

    /// Height of the whole client area, including space outside `rect()`.
    fn document_height(&self) -> f64 {
        self.rect().height()
    }

    /// Top edge of the list root in client coordinates, or `None` while it is not laid out.
    fn root_top(&self) -> Option<f64>;
}

/// Handle returned by [`ListenerSet::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A list of callbacks with subscribe/unsubscribe handles.
pub struct ListenerSet<A> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(A)>)>,
}

impl<A: Copy> ListenerSet<A> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(A) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, arg: A) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<A: Copy> Default for ListenerSet<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ListenerSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// An in-memory scroll surface.
///
/// Useful for headless hosts and tests: the host mirrors real geometry into it (or drives it
/// directly) and forwards the matching [`ViewportEvent`]s to the engine.
#[derive(Debug)]
pub struct WindowViewport {
    kind: ViewportKind,
    client_height: f64,
    offset_top: f64,
    offset_bottom: f64,
    scroll_y: f64,
    content_height: Option<f64>,
    // Position of the list root in document coordinates.
    list_top: Option<f64>,
    rect_change_listeners: ListenerSet<()>,
    scroll_listeners: ListenerSet<()>,
    programmatic_scroll_listeners: ListenerSet<f64>,
}

impl WindowViewport {
    /// A window-backed viewport of `client_height` with the list root at document top.
    pub fn new(client_height: f64) -> Self {
        Self {
            kind: ViewportKind::Window,
            client_height: client_height.max(0.0),
            offset_top: 0.0,
            offset_bottom: 0.0,
            scroll_y: 0.0,
            content_height: None,
            list_top: Some(0.0),
            rect_change_listeners: ListenerSet::new(),
            scroll_listeners: ListenerSet::new(),
            programmatic_scroll_listeners: ListenerSet::new(),
        }
    }

    pub fn with_kind(mut self, kind: ViewportKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_offsets(mut self, offset_top: f64, offset_bottom: f64) -> Self {
        self.offset_top = offset_top;
        self.offset_bottom = offset_bottom;
        self
    }

    pub fn with_list_top(mut self, list_top: Option<f64>) -> Self {
        self.list_top = list_top;
        self
    }

    pub fn set_offset_top(&mut self, top: f64) {
        self.offset_top = top;
    }

    pub fn set_offset_bottom(&mut self, bottom: f64) {
        self.offset_bottom = bottom;
    }

    pub fn offset_top(&self) -> f64 {
        self.offset_top
    }

    pub fn height(&self) -> f64 {
        (self.client_height - self.offset_top - self.offset_bottom).max(0.0)
    }

    pub fn set_list_top(&mut self, list_top: Option<f64>) {
        self.list_top = list_top;
    }

    /// Bounds scrolling to `content_height − client_height` (unbounded when `None`).
    pub fn set_content_height(&mut self, content_height: Option<f64>) {
        self.content_height = content_height;
        self.scroll_y = self.clamp(self.scroll_y);
    }

    pub fn max_scroll_y(&self) -> Option<f64> {
        self.content_height
            .map(|h| (h - self.client_height).max(0.0))
    }

    fn clamp(&self, y: f64) -> f64 {
        let y = y.max(0.0);
        match self.max_scroll_y() {
            Some(max) => y.min(max),
            None => y,
        }
    }

    /// Changes the client height and notifies rect-change listeners.
    pub fn resize(&mut self, client_height: f64) {
        self.client_height = client_height.max(0.0);
        self.scroll_y = self.clamp(self.scroll_y);
        self.rect_change_listeners.notify(());
    }

    /// Moves the surface as a user would, notifying scroll listeners.
    ///
    /// Returns the applied delta.
    pub fn user_scroll_to(&mut self, y: f64) -> f64 {
        let next = self.clamp(y);
        let applied = next - self.scroll_y;
        self.scroll_y = next;
        self.scroll_listeners.notify(());
        applied
    }

    pub fn user_scroll_by(&mut self, delta: f64) -> f64 {
        self.user_scroll_to(self.scroll_y + delta)
    }

    pub fn add_rect_change_listener(&mut self, listener: impl FnMut(()) + 'static) -> ListenerId {
        self.rect_change_listeners.subscribe(listener)
    }

    pub fn add_scroll_listener(&mut self, listener: impl FnMut(()) + 'static) -> ListenerId {
        self.scroll_listeners.subscribe(listener)
    }

    pub fn add_programmatic_scroll_listener(
        &mut self,
        listener: impl FnMut(f64) + 'static,
    ) -> ListenerId {
        self.programmatic_scroll_listeners.subscribe(listener)
    }

    /// Removes a listener registered through any of the `add_*_listener` methods.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.rect_change_listeners.unsubscribe(id)
            | self.scroll_listeners.unsubscribe(id)
            | self.programmatic_scroll_listeners.unsubscribe(id)
    }

    fn apply_programmatic(&mut self, y: f64) -> f64 {
        let next = self.clamp(y);
        let applied = next - self.scroll_y;
        self.scroll_y = next;
        self.programmatic_scroll_listeners.notify(applied);
        applied
    }
}

impl Viewport for WindowViewport {
    fn kind(&self) -> ViewportKind {
        self.kind
    }

    fn rect(&self) -> Rectangle {
        Rectangle::new(self.offset_top, self.height())
    }

    fn offset_bottom(&self) -> f64 {
        self.offset_bottom
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_by(&mut self, delta: f64) -> f64 {
        self.apply_programmatic(self.scroll_y + delta)
    }

    fn scroll_to(&mut self, _x: f64, y: f64) -> f64 {
        self.apply_programmatic(y)
    }

    fn scroll_to_bottom(&mut self) -> f64 {
        let target = self.max_scroll_y().unwrap_or(self.client_height);
        self.apply_programmatic(target)
    }

    fn document_height(&self) -> f64 {
        self.client_height
    }

    fn root_top(&self) -> Option<f64> {
        self.list_top.map(|top| top - self.scroll_y)
    }
}
