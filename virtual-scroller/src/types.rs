use crate::{DataItem, ItemId, Positioning};

/// Half-open index range `[start, end)` of materialized items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    pub start: usize,
    pub end: usize, // exclusive
}

impl Slice {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: &Slice) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn is_disjoint(&self, other: &Slice) -> bool {
        other.start >= self.end || other.end <= self.start
    }

    /// Restores `0 <= start <= end <= len`.
    pub fn clamp_to(self, len: usize) -> Slice {
        let end = self.end.min(len);
        Slice {
            start: self.start.min(end),
            end,
        }
    }
}

/// Where an item should land when it is scrolled into view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Scroll the least amount needed to make the item visible.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Output of a recomputation step, drained by the host with
/// [`crate::VirtualScrollerRenderer::drain_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum RendererEvent {
    PositionUpdate(Positioning),
    /// The scroll-end debounce fired; the engine is idle again.
    ScrollEnd,
    /// Keyboard focus moved to this item; the host should focus its content.
    FocusChanged(ItemId),
}

/// A materialized item ready to be drawn at `offset` (list coordinates).
#[derive(Debug)]
pub struct RenderedCell<'a, T> {
    pub item: &'a DataItem<T>,
    pub offset: f64,
    /// `false` until the item has a measured height; hosts draw it transparent.
    pub visible: bool,
}

impl<T> Clone for RenderedCell<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RenderedCell<'_, T> {}

/// Focus bookkeeping for one rendered item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusableItem {
    pub id: ItemId,
    pub focusable: bool,
    pub visible: bool,
}
