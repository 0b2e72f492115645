use alloc::vec::Vec;

use crate::{ItemId, Rectangle};

/// A rendered item and its rectangle in list coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedItem {
    pub id: ItemId,
    pub rect: Rectangle,
}

/// An immutable geometry snapshot produced once per completed recomputation.
///
/// All rectangles share the list's coordinate origin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Positioning {
    pub viewport_rect: Rectangle,
    pub list_rect: Rectangle,
    pub list_length: usize,
    pub rendered_items: Vec<RenderedItem>,
}

impl Positioning {
    pub fn for_list(&self) -> Rectangle {
        self.list_rect
    }

    pub fn for_viewport(&self) -> Rectangle {
        self.viewport_rect
    }

    pub fn list_length(&self) -> usize {
        self.list_length
    }

    pub fn rendered_items(&self) -> &[RenderedItem] {
        &self.rendered_items
    }

    /// Distance between the list bottom and the viewport bottom.
    pub fn distance_to_list_end(&self) -> f64 {
        self.list_rect.bottom() - self.viewport_rect.bottom()
    }

    /// Distance between the viewport top and the list top.
    pub fn distance_to_list_start(&self) -> f64 {
        self.viewport_rect.top() - self.list_rect.top()
    }
}
