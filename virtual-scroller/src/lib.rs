//! A headless, anchor-based virtual scroller for variable-height lists.
//!
//! For list memoization, edge-proximity wiring and scroll restoration, see the
//! `virtual-scroller-adapter` crate.
//!
//! Only a contiguous slice of the list is materialized. Measured heights are cached per list
//! instance, and the layout is computed around an anchor item whose on-screen position is
//! preserved while heights above it change or items are prepended. When the laid-out list
//! drifts from coordinate 0, it is shifted back and the viewport is scrolled by the same
//! amount, so nothing moves on screen.
//!
//! It is UI-agnostic. The host is expected to provide:
//! - a [`Viewport`] (geometry and programmatic scrolling)
//! - cell lifecycle and height reports
//! - a monotonic clock, passed to [`VirtualScrollerRenderer::tick`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod data_item;
mod height_cache;
mod key;
mod options;
mod positioning;
mod proximity;
mod rect;
mod renderer;
mod schedule;
mod transition;
mod types;
mod viewport;

#[cfg(test)]
mod tests;

pub use anchor::{Anchor, InitialAnchor, RestorationAnchor};
pub use data_item::{DataItem, FOOTER_ID, HEADER_ID};
pub use height_cache::HeightCache;
pub use key::ItemId;
pub use options::RendererOptions;
pub use positioning::{Positioning, RenderedItem};
pub use proximity::{
    EdgeProximity, Proximity, TriggerCause, Zone, ZoneCallback, ZoneCondition,
};
pub use rect::Rectangle;
pub use renderer::{RenderCandidates, VirtualScrollerRenderer, smooth_slice};
pub use schedule::{Debounce, FrameQueue, Throttle};
pub use transition::{Easing, TransitionHint};
pub use types::{Align, FocusableItem, RenderedCell, RendererEvent, ScrollDirection, Slice};
pub use viewport::{ListenerId, ListenerSet, Viewport, ViewportEvent, ViewportKind, WindowViewport};
