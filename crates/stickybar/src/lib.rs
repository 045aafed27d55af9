#![forbid(unsafe_code)]

//! Sticky bar public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use stickybar_config as config;
    pub use stickybar_core as core;
    pub use stickybar_widgets as widgets;
}

pub use stickybar_config::{BarConfig, FlagSource, Saleable, Scope, SettingsStore};
pub use stickybar_core::{
    AttributeChange, BoxMetrics, Element, ManualClock, Subscription, Throttle, TimeSource,
    Viewport, ViewportEvent,
};
pub use stickybar_widgets::{ActivationState, PageAnchors, StickyBar, StickyBarOptions};
