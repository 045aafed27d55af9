#![forbid(unsafe_code)]

//! Viewport event source: scroll offset and window size.
//!
//! [`Viewport`] is the single place scroll and resize signals enter the
//! system. Events carry the measurement they were taken with, so handlers
//! never need to re-borrow the viewport mid-notification.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Setting the scroll offset to its current value emits nothing.
//! 3. Scroll offsets are clamped to be non-negative.

use std::cell::RefCell;
use std::rc::Rc;

use crate::subscription::{SubscriberList, Subscription};

/// A scroll or resize measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    /// The vertical scroll offset changed.
    Scroll {
        /// Vertical scroll offset in pixels.
        top: f64,
    },
    /// The viewport was resized.
    Resize {
        /// New viewport width in pixels.
        width: f64,
        /// New viewport height in pixels.
        height: f64,
        /// Vertical scroll offset at the time of the resize.
        top: f64,
    },
}

impl ViewportEvent {
    /// The vertical scroll offset carried by this event.
    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        match self {
            Self::Scroll { top } | Self::Resize { top, .. } => *top,
        }
    }
}

struct ViewportState {
    scroll_top: f64,
    width: f64,
    height: f64,
}

struct ViewportShared {
    state: RefCell<ViewportState>,
    subscribers: SubscriberList<ViewportEvent>,
}

/// Shared handle to the viewport. Cloning shares state.
pub struct Viewport {
    shared: Rc<ViewportShared>,
}

impl Clone for Viewport {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Viewport")
            .field("scroll_top", &state.scroll_top)
            .field("width", &state.width)
            .field("height", &state.height)
            .finish()
    }
}

impl Viewport {
    /// Create a viewport at scroll offset zero.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            shared: Rc::new(ViewportShared {
                state: RefCell::new(ViewportState {
                    scroll_top: 0.0,
                    width,
                    height,
                }),
                subscribers: SubscriberList::new(),
            }),
        }
    }

    /// Current vertical scroll offset in pixels.
    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.shared.state.borrow().scroll_top
    }

    /// Current viewport size in pixels.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        let state = self.shared.state.borrow();
        (state.width, state.height)
    }

    /// Scroll to `top` (clamped to zero) and notify subscribers.
    ///
    /// Scrolling to the current offset emits nothing.
    pub fn set_scroll_top(&self, top: f64) {
        let top = top.max(0.0);
        {
            let mut state = self.shared.state.borrow_mut();
            if state.scroll_top == top {
                return;
            }
            state.scroll_top = top;
        }
        self.shared.subscribers.notify(&ViewportEvent::Scroll { top });
    }

    /// Resize the viewport and notify subscribers.
    pub fn resize(&self, width: f64, height: f64) {
        let top = {
            let mut state = self.shared.state.borrow_mut();
            state.width = width;
            state.height = height;
            state.scroll_top
        };
        self.shared.subscribers.notify(&ViewportEvent::Resize {
            width,
            height,
            top,
        });
    }

    /// Subscribe to scroll/resize events.
    pub fn subscribe(&self, callback: impl FnMut(&ViewportEvent) + 'static) -> Subscription {
        self.shared.subscribers.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_notifies_with_offset_payload() {
        let viewport = Viewport::new(1280.0, 800.0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = Rc::clone(&seen);
        let _guard = viewport.subscribe(move |event| seen_clone.borrow_mut().push(*event));

        viewport.set_scroll_top(600.0);
        viewport.resize(1024.0, 768.0);

        let events = seen.borrow();
        assert_eq!(events[0], ViewportEvent::Scroll { top: 600.0 });
        assert_eq!(
            events[1],
            ViewportEvent::Resize {
                width: 1024.0,
                height: 768.0,
                top: 600.0
            }
        );
    }

    #[test]
    fn scrolling_to_current_offset_is_silent() {
        let viewport = Viewport::new(1280.0, 800.0);
        let seen = Rc::new(RefCell::new(0u32));

        let seen_clone = Rc::clone(&seen);
        let _guard = viewport.subscribe(move |_| *seen_clone.borrow_mut() += 1);

        viewport.set_scroll_top(100.0);
        viewport.set_scroll_top(100.0);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn negative_offsets_clamp_to_zero() {
        let viewport = Viewport::new(1280.0, 800.0);
        viewport.set_scroll_top(-50.0);
        assert_eq!(viewport.scroll_top(), 0.0);
    }

    #[test]
    fn dropped_subscription_receives_nothing() {
        let viewport = Viewport::new(1280.0, 800.0);
        let seen = Rc::new(RefCell::new(0u32));

        let seen_clone = Rc::clone(&seen);
        let guard = viewport.subscribe(move |_| *seen_clone.borrow_mut() += 1);
        viewport.set_scroll_top(10.0);
        drop(guard);
        viewport.set_scroll_top(20.0);

        assert_eq!(*seen.borrow(), 1);
    }
}
