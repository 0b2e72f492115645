use crate::{ItemId, Rectangle};

/// A positioned reference to one list item, in list coordinates.
///
/// An anchor with `visible == false` has no measured height yet; its offset is a guess and
/// must not feed headroom math.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    pub item_id: ItemId,
    /// Distance from the list window top. May be negative.
    pub offset: f64,
    pub visible: bool,
    pub can_be_anchor: bool,
    pub height: f64,
}

impl Anchor {
    /// An anchor that only pins `item_id` at `offset`.
    pub fn at(item_id: impl Into<ItemId>, offset: f64) -> Self {
        Self {
            item_id: item_id.into(),
            offset,
            visible: false,
            can_be_anchor: false,
            height: 0.0,
        }
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::new(self.offset, self.height)
    }
}

/// The persisted projection of an anchor, used to rebuild a scroll position after a remount.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestorationAnchor {
    pub id: ItemId,
    pub distance_to_viewport_top: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub was_focused: bool,
}

/// How the first layout after a mount (or cache-key swap) is positioned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialAnchor {
    /// Start at the given item; it is focused and scrolled into view.
    Focused { id: ItemId },
    /// Rebuild a previously captured position.
    Restore(RestorationAnchor),
}
