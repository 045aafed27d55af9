#![forbid(unsafe_code)]

//! Sticky add-to-cart bar: a controller that keeps a condensed product bar in
//! sync with the page's primary add-to-cart control while the shopper
//! scrolls.

pub mod sticky_bar;
pub mod summary;

pub use sticky_bar::{ActivationState, PageAnchors, StickyBar, StickyBarOptions};
pub use summary::build_summary;
