#![forbid(unsafe_code)]

//! Sticky add-to-cart bar controller.
//!
//! One controller attaches to one sticky container on a product page. A
//! throttled viewport measurement drives a two-state machine: while the
//! scroll offset strictly exceeds the configured threshold the bar is
//! `Active` — visible, mirroring the primary add-to-cart button, and (when
//! configured) hosting the page's live price markup. Dropping back to or
//! below the threshold reverses all of it.
//!
//! # Invariants
//!
//! 1. State is `Active` iff the most recent admitted measurement exceeded
//!    the threshold; a measurement equal to the threshold deactivates.
//! 2. [`activate()`](StickyBar::activate) and
//!    [`deactivate()`](StickyBar::deactivate) are idempotent: re-entering
//!    the current state changes nothing.
//! 3. The primary price container ends every deactivation with exactly the
//!    children it started with, in original order.
//! 4. The button mirror exists only while `Active`; after deactivation or
//!    detach, primary-button mutations produce no sticky-button update.
//! 5. Every missing page anchor silently disables only the behavior that
//!    depends on it.

use std::cell::RefCell;
use std::rc::Rc;

use stickybar_config::{BarConfig, FlagSource, Scope};
use stickybar_core::{Element, Subscription, Throttle, Viewport, ViewportEvent};

use crate::summary::build_summary;

// ---------------------------------------------------------------------------
// Options and anchors
// ---------------------------------------------------------------------------

/// Immutable configuration captured at attach time.
#[derive(Debug)]
pub struct StickyBarOptions {
    show_price: bool,
    show_summary: bool,
    offset_px: f64,
    margin_top_px: f64,
    throttle: Throttle,
}

impl StickyBarOptions {
    /// Defaults: price and summary off, 500 px threshold, 200 ms throttle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_price: false,
            show_summary: false,
            offset_px: 500.0,
            margin_top_px: 0.0,
            throttle: Throttle::default(),
        }
    }

    /// Options derived from the settings store: the price flag maps to the
    /// price relocation behavior. Everything else keeps its default.
    #[must_use]
    pub fn from_config<S: FlagSource>(config: &BarConfig<S>, scope: &Scope) -> Self {
        Self::new().show_price(config.can_show_price(scope))
    }

    /// Enable price relocation into the bar.
    #[must_use]
    pub fn show_price(mut self, show: bool) -> Self {
        self.show_price = show;
        self
    }

    /// Enable the tab summary list next to the bar.
    #[must_use]
    pub fn show_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Scroll offset (px) past which the bar activates. Clamped to zero.
    #[must_use]
    pub fn offset_px(mut self, offset: f64) -> Self {
        self.offset_px = offset.max(0.0);
        self
    }

    /// Initial top margin (px). Replaced at attach time by the measured
    /// box-model difference of the container.
    #[must_use]
    pub fn margin_top_px(mut self, margin: f64) -> Self {
        self.margin_top_px = margin;
        self
    }

    /// Replace the measurement throttle (interval and clock).
    #[must_use]
    pub fn throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }
}

impl Default for StickyBarOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Page-owned elements the controller coordinates with.
///
/// Handles are resolved once by the host; a `None` (or empty) anchor
/// silently disables the dependent behavior.
#[derive(Debug, Default)]
pub struct PageAnchors {
    /// The primary add-to-cart button.
    pub add_to_cart: Option<Element>,
    /// Elements stacked above the bar (notices, demo banners); the first
    /// one's height feeds the activation margin.
    pub sticky_after: Vec<Element>,
    /// The primary price container under the product info region.
    pub price_box: Option<Element>,
    /// The tabbed detailed-information region, if the page has one.
    pub tablist: Option<Element>,
}

/// Controller activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    /// Bar hidden, no mirror, price markup in its primary location.
    #[default]
    Inactive,
    /// Bar visible, mirroring the primary button.
    Active,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

struct StickyBarInner {
    container: Element,
    sticky_button: Option<Element>,
    sticky_price_box: Option<Element>,
    summary: Option<Element>,
    anchors: PageAnchors,
    options: StickyBarOptions,
    margin_top: f64,
    state: ActivationState,
    mirror_sub: Option<Subscription>,
    click_sub: Option<Subscription>,
    viewport_sub: Option<Subscription>,
}

/// Handles and flags needed for one transition, captured under the borrow
/// and used after it is released.
struct TransitionPlan {
    container: Element,
    show_price: bool,
    price_box: Option<Element>,
    sticky_price_box: Option<Element>,
    stack_above: Option<Element>,
    margin_top: f64,
    add_to_cart: Option<Element>,
    sticky_button: Option<Element>,
}

impl StickyBarInner {
    fn plan(&self) -> TransitionPlan {
        TransitionPlan {
            container: self.container.clone(),
            show_price: self.options.show_price,
            price_box: self.anchors.price_box.clone(),
            sticky_price_box: self.sticky_price_box.clone(),
            stack_above: self.anchors.sticky_after.first().cloned(),
            margin_top: self.margin_top,
            add_to_cart: self.anchors.add_to_cart.clone(),
            sticky_button: self.sticky_button.clone(),
        }
    }
}

/// One sticky bar bound to one container element.
///
/// Holds its own configuration and state; there is no shared registry.
pub struct StickyBar {
    inner: Rc<RefCell<StickyBarInner>>,
}

impl std::fmt::Debug for StickyBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StickyBar")
            .field("state", &inner.state)
            .field("show_price", &inner.options.show_price)
            .field("offset_px", &inner.options.offset_px)
            .finish()
    }
}

impl StickyBar {
    /// Attach a controller to `container` and start listening to `viewport`.
    ///
    /// Runs the one-time setup: measures the container's own-box margin,
    /// resolves the sticky button and price box inside the container, binds
    /// click forwarding to the primary add-to-cart control, and (when
    /// enabled) builds the tab summary list.
    pub fn attach(
        container: Element,
        anchors: PageAnchors,
        viewport: &Viewport,
        options: StickyBarOptions,
    ) -> Self {
        // Own-box margin, measured once. Never recomputed on resize.
        let margin_top = container.outer_width(true) - container.outer_width(false);
        let sticky_button = container.find_descendant(|el| el.tag() == "button");
        let sticky_price_box = container.find_descendant(|el| el.has_class("price-box"));

        let click_sub = match (&sticky_button, &anchors.add_to_cart) {
            (Some(button), Some(primary)) => {
                let primary = primary.clone();
                Some(button.on_click(move || primary.click()))
            }
            _ => None,
        };

        let mut summary = None;
        if options.show_summary
            && let Some(tablist) = &anchors.tablist
            && let Some(list) = build_summary(tablist)
        {
            if let Some(wrapper) = container.find_child(|el| el.has_class("container")) {
                container.insert_after_child(&wrapper, &list);
            }
            summary = Some(list);
        }

        tracing::debug!(
            message = "stickybar.attach",
            show_price = options.show_price,
            show_summary = options.show_summary,
            offset_px = options.offset_px,
            margin_top,
            has_add_to_cart = anchors.add_to_cart.is_some(),
        );

        let inner = Rc::new(RefCell::new(StickyBarInner {
            container,
            sticky_button,
            sticky_price_box,
            summary,
            anchors,
            options,
            margin_top,
            state: ActivationState::Inactive,
            mirror_sub: None,
            click_sub,
            viewport_sub: None,
        }));

        let weak = Rc::downgrade(&inner);
        let viewport_sub = viewport.subscribe(move |event| {
            if let Some(strong) = weak.upgrade() {
                Self::on_viewport_event(&strong, event);
            }
        });
        inner.borrow_mut().viewport_sub = Some(viewport_sub);

        Self { inner }
    }

    /// Current activation state.
    #[must_use]
    pub fn state(&self) -> ActivationState {
        self.inner.borrow().state
    }

    /// Whether the bar is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == ActivationState::Active
    }

    /// The own-box margin measured at attach time.
    #[must_use]
    pub fn margin_top(&self) -> f64 {
        self.inner.borrow().margin_top
    }

    /// The summary list, if one was built at attach time.
    #[must_use]
    pub fn summary(&self) -> Option<Element> {
        self.inner.borrow().summary.clone()
    }

    /// Activate the bar. No-op while already active.
    pub fn activate(&self) {
        Self::enter_active(&self.inner);
    }

    /// Deactivate the bar. No-op while already inactive.
    pub fn deactivate(&self) {
        Self::enter_inactive(&self.inner);
    }

    /// Detach the controller: stop listening to the viewport, unbind click
    /// forwarding, drop any active mirror, and — when detaching while active
    /// with price relocation on — restore the relocated price nodes.
    ///
    /// The summary list, if any, is left in place.
    pub fn detach(&self) {
        let (viewport_sub, click_sub, mirror_sub, restore) = {
            let mut inner = self.inner.borrow_mut();
            let restore = if inner.state == ActivationState::Active && inner.options.show_price {
                inner.state = ActivationState::Inactive;
                Some((inner.anchors.price_box.clone(), inner.sticky_price_box.clone()))
            } else {
                inner.state = ActivationState::Inactive;
                None
            };
            (
                inner.viewport_sub.take(),
                inner.click_sub.take(),
                inner.mirror_sub.take(),
                restore,
            )
        };
        drop(viewport_sub);
        drop(click_sub);
        drop(mirror_sub);
        if let Some((Some(primary), Some(sticky))) = restore {
            restore_price(&primary, &sticky);
        }
        tracing::debug!(message = "stickybar.detach");
    }

    fn on_viewport_event(inner: &Rc<RefCell<StickyBarInner>>, event: &ViewportEvent) {
        let next = {
            let mut state = inner.borrow_mut();
            if !state.options.throttle.ready() {
                return;
            }
            let above = event.scroll_top() > state.options.offset_px;
            match (above, state.state) {
                (true, ActivationState::Inactive) => Some(ActivationState::Active),
                (false, ActivationState::Active) => Some(ActivationState::Inactive),
                _ => None,
            }
        };
        match next {
            Some(ActivationState::Active) => Self::enter_active(inner),
            Some(ActivationState::Inactive) => Self::enter_inactive(inner),
            None => {}
        }
    }

    fn enter_active(inner: &Rc<RefCell<StickyBarInner>>) {
        let plan = {
            let mut state = inner.borrow_mut();
            if state.state == ActivationState::Active {
                return;
            }
            state.state = ActivationState::Active;
            state.plan()
        };

        if plan.show_price
            && let (Some(primary), Some(sticky)) = (&plan.price_box, &plan.sticky_price_box)
        {
            relocate_price(primary, sticky);
        }

        if let Some(above) = &plan.stack_above {
            let margin = plan.margin_top + above.outer_height(false);
            plan.container.set_style("margin-top", &format!("{margin}px"));
        }

        let mirror = match (&plan.add_to_cart, &plan.sticky_button) {
            (Some(primary), Some(sticky)) => Some(establish_mirror(primary, sticky)),
            _ => None,
        };
        inner.borrow_mut().mirror_sub = mirror;

        plan.container.set_attribute("aria-hidden", "false");
        plan.container.show();
        tracing::debug!(message = "stickybar.activate", show_price = plan.show_price);
    }

    fn enter_inactive(inner: &Rc<RefCell<StickyBarInner>>) {
        let (plan, mirror_sub) = {
            let mut state = inner.borrow_mut();
            if state.state == ActivationState::Inactive {
                return;
            }
            state.state = ActivationState::Inactive;
            (state.plan(), state.mirror_sub.take())
        };

        if plan.show_price
            && let (Some(primary), Some(sticky)) = (&plan.price_box, &plan.sticky_price_box)
        {
            restore_price(primary, sticky);
        }
        drop(mirror_sub);

        plan.container.set_attribute("aria-hidden", "true");
        plan.container.hide();
        tracing::debug!(message = "stickybar.deactivate", show_price = plan.show_price);
    }
}

// ---------------------------------------------------------------------------
// DOM synchronization
// ---------------------------------------------------------------------------

/// Move the live price nodes into the sticky box, leaving structural clones
/// behind so the page layout is undisturbed.
fn relocate_price(primary: &Element, sticky: &Element) {
    for child in primary.children() {
        primary.append_child(&child.clone_deep());
        primary.remove_child(&child);
        sticky.append_child(&child);
    }
}

/// Reverse of [`relocate_price`]: drop the clones, move the live nodes back
/// in their original order.
fn restore_price(primary: &Element, sticky: &Element) {
    let _ = primary.take_children();
    for child in sticky.take_children() {
        primary.append_child(&child);
    }
}

/// Watch the primary button for attribute mutations and copy its rendered
/// content and class list onto the sticky button on every change.
fn establish_mirror(primary: &Element, sticky: &Element) -> Subscription {
    let source = primary.clone();
    let target = sticky.clone();
    primary.observe_attributes(move |_change| {
        let _ = target.take_children();
        for child in source.children() {
            target.append_child(&child.clone_deep());
        }
        target.set_text(&source.text());
        match source.attribute("class") {
            Some(class) => target.set_attribute("class", &class),
            None => {
                target.remove_attribute("class");
            }
        }
    })
}
