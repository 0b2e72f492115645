use alloc::vec::Vec;

use super::VirtualScrollerRenderer;
use crate::rect::snap_to_device_pixels;
use crate::{
    Anchor, DataItem, InitialAnchor, Positioning, Rectangle, RenderedItem, RendererEvent,
    RestorationAnchor, Slice, Viewport, ViewportKind,
};

/// The outcome of windowing the list around one anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCandidates {
    pub slice: Slice,
    /// Every list item, laid out from the anchor.
    pub all_items_with_positions: Vec<Anchor>,
    /// `all_items_with_positions[slice]`.
    pub new_rendered_items: Vec<Anchor>,
    /// Whether the preferred (wide) band was used instead of the minimum one.
    pub are_preferred_items_rendered: bool,
}

/// Merges a freshly computed candidate slice into the current one.
///
/// A short current slice that still covers the candidates is kept as is; a disjoint one is
/// replaced. Otherwise the current slice moves toward the candidates by the larger of its two
/// edge deficits, never excluding a candidate.
pub fn smooth_slice(current: Slice, candidate: Slice, keep_limit: usize) -> Slice {
    if current.contains(&candidate) && current.len() <= keep_limit {
        return current;
    }
    if current.is_disjoint(&candidate) {
        return candidate;
    }
    let shift = current
        .start
        .saturating_sub(candidate.start)
        .max(candidate.end.saturating_sub(current.end));
    Slice {
        start: (current.start + shift).min(candidate.start),
        end: current.end.saturating_sub(shift).max(candidate.end),
    }
}

impl<T, V: Viewport> VirtualScrollerRenderer<T, V> {
    /// Recomputes the layout against the current viewport.
    ///
    /// Does nothing while the list root is not laid out or fullscreen is active.
    pub fn update(&mut self) {
        let Some(rect) = self.relative_viewport_rect() else {
            vtrace!("update skipped: list root not laid out");
            return;
        };
        if self.is_fullscreen {
            return;
        }
        let anchor = self.anchor_for(rect);
        self.measure_heights();
        match anchor {
            Some(anchor) => {
                self.update_rendered_items(&anchor, rect);
                if self.following_newest {
                    self.scroll_to_newest_edge();
                }
            }
            None => self.clear_rendered_items(),
        }
    }

    fn clear_rendered_items(&mut self) {
        vtrace!(len = self.list.len(), "no anchor: clearing rendered items");
        self.rendered_items.clear();
        self.slice = Slice::default();
        self.list_height_with_headroom = 0.0;
        self.current_headroom = 0.0;
    }

    fn is_anchor_candidate(&self, item: &DataItem<T>) -> bool {
        item.can_be_anchor
            && (self.is_initial_anchoring
                || self.heights.get(&item.id).is_some_and(|h| h != 0.0))
    }

    /// Picks the item whose on-screen position is preserved by the next layout.
    ///
    /// Prefers visible items (more than 1% of their height on screen), then the one whose
    /// bottom is closest to the viewport top.
    pub fn anchor_for(&self, viewport_rect: Rectangle) -> Option<Anchor> {
        let pinned = self.following_newest || self.should_pin_to_newest();
        if pinned && !self.options.center_initial_anchor {
            if self.options.has_new_content_at_bottom {
                if let Some((_, last)) = self.final_rendered().last() {
                    return Some(Anchor::at(last.item_id.clone(), last.offset));
                }
                // Nothing laid out yet: the last item ends at the viewport bottom.
                return self.list.last().map(|item| {
                    let offset = viewport_rect.bottom() - self.height_for_id(&item.id);
                    Anchor::at(item.id.clone(), offset)
                });
            }
            return self.list.first().map(|item| Anchor::at(item.id.clone(), 0.0));
        }

        let mut best: Option<(&Anchor, bool, f64)> = None;
        for (item, anchor) in self.final_rendered() {
            if !self.is_anchor_candidate(item) {
                continue;
            }
            let rect = Rectangle::new(anchor.offset, self.height_for_id(&item.id));
            let visible =
                rect.height() > 0.0 && rect.overlap(&viewport_rect) / rect.height() > 0.01;
            let below_top = rect.bottom() - viewport_rect.top();
            let better = match best {
                None => true,
                Some((_, best_visible, best_below_top)) => {
                    (visible && !best_visible)
                        || (visible == best_visible && below_top < best_below_top)
                }
            };
            if better {
                best = Some((anchor, visible, below_top));
            }
        }
        if let Some((anchor, _, _)) = best {
            return Some(Anchor::at(anchor.item_id.clone(), anchor.offset));
        }
        self.list.first().map(|item| Anchor::at(item.id.clone(), 0.0))
    }

    /// The anchor for the current viewport, if the list root is laid out.
    pub fn anchor(&self) -> Option<Anchor> {
        self.relative_viewport_rect()
            .and_then(|rect| self.anchor_for(rect))
    }

    /// Sum of the heights above `id` (0 when `id` is not in the list).
    pub fn distance_from_top(&self, id: &str) -> f64 {
        let Some(&index) = self.index_of.get(id) else {
            return 0.0;
        };
        self.list
            .iter()
            .take(index)
            .map(|item| self.height_for_id(&item.id))
            .sum()
    }

    /// Lays out the whole list so that `anchor.item_id` sits at `anchor.offset`.
    pub fn items_with_positions(&self, anchor: &Anchor) -> Vec<Anchor> {
        let mut offset = anchor.offset - self.distance_from_top(&anchor.item_id);
        self.list
            .iter()
            .map(|item| {
                let height = self.height_for_id(&item.id);
                let positioned = Anchor {
                    item_id: item.id.clone(),
                    offset,
                    visible: self.heights.contains(&item.id),
                    can_be_anchor: item.can_be_anchor,
                    height,
                };
                offset += height;
                positioned
            })
            .collect()
    }

    /// Chooses the slice to materialize around `anchor` for `viewport_rect`.
    pub fn render_candidates(&self, anchor: &Anchor, viewport_rect: Rectangle) -> RenderCandidates {
        let are_preferred_items_rendered = self.is_idle && !self.is_initial_anchoring;
        let band = viewport_rect.expand_by_ratio(if are_preferred_items_rendered {
            self.options.preferred_offscreen_to_viewport_ratio
        } else {
            self.options.minimum_offscreen_to_viewport_ratio
        });

        let all = self.items_with_positions(anchor);
        let first = all.iter().position(|a| a.rect().intersects(&band));
        let last = all.iter().rposition(|a| a.rect().intersects(&band));
        let candidate = match (first, last) {
            (Some(start), Some(end)) => Slice::new(start, end + 1),
            _ => Slice::default(),
        };

        let slice = if are_preferred_items_rendered {
            candidate
        } else {
            smooth_slice(self.slice, candidate, self.options.slice_keep_limit)
        }
        .clamp_to(all.len());

        RenderCandidates {
            slice,
            new_rendered_items: all[slice.start..slice.end].to_vec(),
            all_items_with_positions: all,
            are_preferred_items_rendered,
        }
    }

    fn top_headroom(&self, positions: &[Anchor], viewport_rect: Rectangle) -> f64 {
        let Some(first) = positions.first() else {
            return 0.0;
        };
        let last_anchor = positions.iter().rev().find(|a| a.can_be_anchor).unwrap_or(first);
        let height = last_anchor.rect().bottom() - first.rect().top();
        let space = self.viewport.document_height() - viewport_rect.height();
        (viewport_rect.height() - height - space).max(0.0)
    }

    fn bottom_headroom(&self, positions: &[Anchor], viewport_rect: Rectangle) -> f64 {
        let Some(last) = positions.last() else {
            return 0.0;
        };
        let last_anchor = positions.iter().rev().find(|a| a.can_be_anchor).unwrap_or(last);
        let height = last.rect().bottom() - last_anchor.rect().top();
        (viewport_rect.height() - height + self.viewport.offset_bottom()).max(0.0)
    }

    /// Computes the headroom for `positions` and records it as the current headroom.
    pub(crate) fn calculate_headroom(
        &mut self,
        positions: &[Anchor],
        viewport_rect: Rectangle,
    ) -> f64 {
        let headroom = if self.options.without_headroom {
            0.0
        } else if self.options.center_initial_anchor {
            self.top_headroom(positions, viewport_rect)
                + self.bottom_headroom(positions, viewport_rect)
        } else if self.options.has_new_content_at_bottom {
            self.top_headroom(positions, viewport_rect)
        } else {
            self.bottom_headroom(positions, viewport_rect)
        };
        self.current_headroom = headroom;
        headroom
    }

    /// How far the list top (plus headroom for bottom-growing lists) is from coordinate 0
    /// when laid out from `anchor`.
    pub fn list_offset(&self, anchor: &Anchor) -> f64 {
        let offset = anchor.offset - self.distance_from_top(&anchor.item_id);
        if self.options.has_new_content_at_bottom {
            offset - self.current_headroom
        } else {
            offset
        }
    }

    pub fn should_normalize(&self, anchor: &Anchor) -> bool {
        self.list_offset(anchor) != 0.0
    }

    fn heights_ready(&self, items: &[Anchor]) -> bool {
        items.iter().any(|a| self.heights.contains(&a.item_id))
    }

    fn update_rendered_items(&mut self, anchor: &Anchor, viewport_rect: Rectangle) {
        let RenderCandidates {
            slice,
            all_items_with_positions: all,
            new_rendered_items,
            are_preferred_items_rendered,
        } = self.render_candidates(anchor, viewport_rect);

        let has_animations = self.has_animations();
        let list_top = all.first().map_or(0.0, |a| a.offset);
        let height = all.last().map_or(0.0, |a| a.rect().bottom()) - list_top;
        let list_height_with_headroom = height + self.calculate_headroom(&all, viewport_rect);
        let offset = self.list_offset(anchor);
        let normalize = offset != 0.0;
        let heights_ready = self.heights_ready(&new_rendered_items);
        let settled = self.is_idle
            || !self.options.defer_correction_while_scrolling
            || list_height_with_headroom <= viewport_rect.height();
        let ready_for_measuring = (!has_animations && heights_ready && settled)
            || (heights_ready && self.is_initial_anchoring);

        self.slice = slice;
        if heights_ready {
            self.is_initial_anchoring = false;
        }
        self.list_height_with_headroom = list_height_with_headroom;
        vtrace!(
            start = slice.start,
            end = slice.end,
            offset,
            heights_ready,
            "update_rendered_items"
        );

        if normalize && ready_for_measuring {
            vdebug!(offset, "normalizing list offset");
            self.rendered_items = new_rendered_items
                .into_iter()
                .map(|mut a| {
                    a.offset -= offset;
                    a
                })
                .collect();
            self.should_animate = false;
            self.scroll_viewport_by(-offset);
            if let Some(rect) = self.relative_viewport_rect() {
                self.update_positioning(rect, list_top - offset, height);
            }
        } else {
            self.rendered_items = new_rendered_items;
            self.should_animate = true;
            if normalize || !are_preferred_items_rendered {
                self.settle.request(self.now_ms);
            }
            self.update_positioning(viewport_rect, list_top, height);
        }
    }

    fn update_positioning(&mut self, viewport_rect: Rectangle, list_top: f64, list_height: f64) {
        if !self.heights_ready(&self.rendered_items) {
            return;
        }
        let rendered_items: Vec<RenderedItem> = self
            .final_rendered()
            .map(|(item, anchor)| RenderedItem {
                id: item.id.clone(),
                rect: Rectangle::new(anchor.offset, self.height_for_id(&item.id)),
            })
            .collect();
        self.events.push(RendererEvent::PositionUpdate(Positioning {
            viewport_rect,
            list_rect: Rectangle::new(list_top, list_height),
            list_length: self.list.len(),
            rendered_items,
        }));
    }

    /// Whether the viewport sits at the edge where new content appears.
    ///
    /// `true` while the list root is not laid out.
    pub fn is_at_newest(&self) -> bool {
        let Some(rect) = self.relative_viewport_rect() else {
            return true;
        };
        let tolerance = self.options.newest_edge_tolerance;
        if self.options.has_new_content_at_bottom {
            rect.bottom() >= self.list_height_with_headroom - tolerance
        } else {
            rect.top() <= tolerance
        }
    }

    fn should_pin_to_newest(&self) -> bool {
        !self.is_initial_anchoring
            && self.options.pin_to_newest_when_at_newest
            && self.is_at_newest()
    }

    /// Offset of the list root from the viewport top, snapped to device pixels.
    pub fn viewport_offset_correction(&self) -> f64 {
        let Some(root_top) = self.viewport.root_top() else {
            return 0.0;
        };
        let top = match self.viewport.kind() {
            ViewportKind::Window => 0.0,
            ViewportKind::Element => self.viewport.rect().top(),
        };
        snap_to_device_pixels(root_top - top, self.options.device_pixel_ratio)
    }

    /// Captures the on-screen anchorable items so the position can be rebuilt later.
    pub fn get_anchors(&self) -> Vec<RestorationAnchor> {
        let Some(viewport_rect) = self.relative_viewport_rect() else {
            return Vec::new();
        };
        let correction = self.viewport_offset_correction();
        let dpr = self.options.device_pixel_ratio;
        self.final_rendered()
            .filter(|(item, anchor)| {
                item.can_be_anchor
                    && Rectangle::new(anchor.offset, self.height_for_id(&item.id))
                        .intersects(&viewport_rect)
            })
            .map(|(item, anchor)| RestorationAnchor {
                id: item.id.clone(),
                distance_to_viewport_top: snap_to_device_pixels(anchor.offset + correction, dpr),
                was_focused: self.has_user_changed_focus
                    && self.active_entry_id.as_deref() == Some(item.id.as_str()),
            })
            .collect()
    }

    pub(super) fn initial_rendered_items(&self) -> Vec<Anchor> {
        let mut rendered = Vec::new();
        match &self.options.initial_anchor {
            None => {}
            Some(InitialAnchor::Focused { id }) => {
                let Some(item) = self.list.iter().find(|item| item.id == *id) else {
                    return rendered;
                };
                let offset = if self.options.center_initial_anchor {
                    let half_viewport = crate::rect::ceil(self.viewport.document_height() / 2.0);
                    half_viewport - self.height_for_id(id) / 2.0
                } else {
                    0.0
                };
                rendered.push(self.initial_anchor_at(item, offset));
            }
            Some(InitialAnchor::Restore(restore)) => {
                let Some(index) = self.list.iter().position(|item| item.id == restore.id) else {
                    return rendered;
                };
                let viewport_height = self.viewport.document_height();

                let mut offset = restore.distance_to_viewport_top;
                for item in &self.list[index..] {
                    if offset >= viewport_height {
                        break;
                    }
                    let Some(height) = self.heights.get(&item.id) else {
                        break;
                    };
                    rendered.push(self.initial_anchor_at(item, offset));
                    offset += height;
                }

                let mut before = Vec::new();
                let mut offset = restore.distance_to_viewport_top;
                for item in self.list[..index].iter().rev() {
                    if offset <= 0.0 {
                        break;
                    }
                    let Some(height) = self.heights.get(&item.id) else {
                        break;
                    };
                    offset -= height;
                    before.push(self.initial_anchor_at(item, offset));
                }
                before.reverse();
                before.append(&mut rendered);
                rendered = before;
            }
        }
        rendered
    }

    fn initial_anchor_at(&self, item: &DataItem<T>, offset: f64) -> Anchor {
        Anchor {
            item_id: item.id.clone(),
            offset,
            visible: true,
            can_be_anchor: item.can_be_anchor,
            height: self.height_for_id(&item.id),
        }
    }
}
