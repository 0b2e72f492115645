use alloc::vec::Vec;

use super::VirtualScrollerRenderer;
use crate::{Align, FocusableItem, ItemId, Rectangle, RendererEvent, Viewport};

fn first_focusable(items: &[FocusableItem]) -> Option<ItemId> {
    items.iter().find(|i| i.focusable).map(|i| i.id.clone())
}

impl<T, V: Viewport> VirtualScrollerRenderer<T, V> {
    /// Rendered items in list order with their focus bookkeeping.
    pub fn rendered_items_with_focusability(&self) -> Vec<FocusableItem> {
        self.final_rendered()
            .map(|(item, anchor)| FocusableItem {
                id: item.id.clone(),
                focusable: self.cells.get(item.id.as_str()).is_some_and(|c| c.focusable),
                visible: anchor.visible,
            })
            .collect()
    }

    /// The first rendered item that intersects the viewport.
    pub fn find_newest_visible_id(&self) -> Option<ItemId> {
        let viewport_rect = self.relative_viewport_rect()?;
        self.final_rendered()
            .find(|(item, anchor)| {
                Rectangle::new(anchor.offset, self.height_for_id(&item.id))
                    .intersects(&viewport_rect)
            })
            .map(|(item, _)| item.id.clone())
    }

    /// Moves keyboard focus `by` focusable items (negative moves toward the list start).
    ///
    /// Without an active item, focus lands on the first focusable item at or after the first
    /// on-screen one.
    pub fn adjust_focus_by(&mut self, by: isize) {
        self.has_user_changed_focus = true;
        let items = self.rendered_items_with_focusability();
        let mut target: Option<ItemId> = None;

        if let Some(active) = self.active_entry_id.as_deref() {
            if let Some(active_index) = items.iter().position(|i| i.id == active) {
                target = Some(ItemId::from(active));
                if by != 0 {
                    let mut i = active_index as isize + by;
                    while i >= 0 && (i as usize) < items.len() {
                        let item = &items[i as usize];
                        if item.focusable {
                            target = Some(item.id.clone());
                            break;
                        }
                        i += by;
                    }
                }
            }
        }

        if target.is_none() {
            target = match self.find_newest_visible_id() {
                Some(newest) => items.iter().position(|i| i.id == newest).and_then(|start| {
                    items[start..]
                        .iter()
                        .find(|i| i.focusable)
                        .map(|i| i.id.clone())
                        .or_else(|| first_focusable(&items))
                }),
                None => first_focusable(&items),
            };
        }

        if let Some(id) = target {
            self.focus_item(&id, Align::Start);
        }
    }

    pub fn focus_next(&mut self) {
        self.adjust_focus_by(1);
    }

    pub fn focus_previous(&mut self) {
        self.adjust_focus_by(-1);
    }

    /// Makes `id` the active item. Returns `false` when it already is, or when it is not a
    /// rendered, measured item.
    ///
    /// A mounted, focusable cell is scrolled into view with `align`.
    pub fn focus_item(&mut self, id: &str, align: Align) -> bool {
        if self.active_entry_id.as_deref() == Some(id) {
            return false;
        }
        let Some(item_rect) = self
            .final_rendered()
            .find(|(item, anchor)| anchor.visible && item.id == id)
            .map(|(item, anchor)| Rectangle::new(anchor.offset, self.height_for_id(&item.id)))
        else {
            return false;
        };

        self.active_entry_id = Some(ItemId::from(id));
        self.events.push(RendererEvent::FocusChanged(ItemId::from(id)));
        vtrace!(id, "focus changed");

        if self.cells.get(id).is_some_and(|c| c.focusable) {
            self.scroll_into_view(item_rect, align);
        }
        true
    }

    fn scroll_into_view(&mut self, item: Rectangle, align: Align) {
        let Some(view) = self.relative_viewport_rect() else {
            return;
        };
        let delta = match align {
            Align::Start => item.top() - view.top(),
            Align::End => item.bottom() - view.bottom(),
            Align::Center => item.center() - view.center(),
            Align::Auto => {
                if item.top() >= view.top() && item.bottom() <= view.bottom() {
                    0.0
                } else if item.top() < view.top() {
                    item.top() - view.top()
                } else {
                    item.bottom() - view.bottom()
                }
            }
        };
        if delta != 0.0 {
            self.scroll_viewport_by(delta);
        }
    }

    /// Scrolls to the edge where new content appears.
    ///
    /// With `update`, recomputes immediately and focuses the first focusable item on the next
    /// `tick`.
    pub fn scroll_to_newest(&mut self, update: bool) {
        self.has_user_changed_focus = true;
        self.scroll_to_newest_edge();
        if !update {
            return;
        }
        self.update();
        self.focus_newest_pending = true;
    }

    /// Brings the viewport bottom to the end of the list (bottom-growing lists) or the
    /// viewport top to the list top.
    pub(super) fn scroll_to_newest_edge(&mut self) {
        if !self.options.has_new_content_at_bottom {
            let applied = self.viewport.scroll_to_top();
            self.previous_scroll_y += applied;
            return;
        }
        if let Some(view) = self.relative_viewport_rect() {
            let delta = self.list_height_with_headroom - view.bottom();
            if delta != 0.0 {
                self.scroll_viewport_by(delta);
            }
        }
    }

    pub(super) fn focus_newest_focusable(&mut self) {
        let items = self.rendered_items_with_focusability();
        if let Some(id) = first_focusable(&items) {
            self.focus_item(&id, Align::Auto);
        }
    }
}
