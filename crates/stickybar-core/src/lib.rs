#![forbid(unsafe_code)]

//! Core primitives for the sticky bar: retained element tree, viewport event
//! source, attribute observation, and throttling.

pub mod element;
pub mod subscription;
pub mod throttle;
pub mod viewport;

pub use element::{AttributeChange, BoxMetrics, Element};
pub use subscription::Subscription;
pub use throttle::{ManualClock, Throttle, TimeSource};
pub use viewport::{Viewport, ViewportEvent};
