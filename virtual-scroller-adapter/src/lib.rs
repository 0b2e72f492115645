//! Adapter utilities for the `virtual-scroller` crate.
//!
//! The `virtual-scroller` crate is UI-agnostic and only knows about [`DataItem`] lists and a
//! viewport. This crate provides the list-level glue commonly needed on top of it:
//!
//! - Memoized conversion of caller items (plus an optional header/footer) into the engine list
//! - Edge-proximity callbacks for pagination (`on_at_start`, `on_near_end`, ...)
//! - Scroll-position persistence and restoration ([`CustomLocation`])
//! - Keyboard focus navigation helpers
//!
//! This crate is framework-agnostic: what an item renders to is up to the caller.
//!
//! [`DataItem`]: virtual_scroller::DataItem
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod list;
mod location;
mod options;
mod scroller;


pub use list::{Entry, ListBuilder};
pub use location::{
    CustomLocation, LocationConfig, MemoryPositionStore, PositionStore, SavedPosition,
};
pub use options::{
    IdentityFn, ItemRenderer, NotifyCallback, PositionCallback, SortIndexFn, StaticRenderer,
    VirtualScrollerOptions,
};
pub use scroller::{Cell, FocusableSlot, RenderOutput, VirtualScroller};
