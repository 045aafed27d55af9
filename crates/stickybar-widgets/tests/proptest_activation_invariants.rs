#![forbid(unsafe_code)]

//! Property tests for the activation state machine and the price
//! relocate/restore contract.

use proptest::prelude::*;

use stickybar_core::{Element, Throttle, Viewport};
use stickybar_widgets::{ActivationState, PageAnchors, StickyBar, StickyBarOptions};
use web_time::Duration;

const THRESHOLD: f64 = 500.0;

struct Page {
    container: Element,
    price_box: Element,
    sticky_price_box: Element,
    viewport: Viewport,
}

fn build_page(price_labels: &[String]) -> Page {
    let sticky_price_box = Element::new("div").with_class("price-box");
    let container = Element::new("div")
        .with_attribute("data-role", "sticky-product")
        .with_child(
            Element::new("div")
                .with_class("container")
                .with_child(Element::new("button"))
                .with_child(sticky_price_box.clone()),
        )
        .hidden();

    let price_box = Element::new("div").with_class("price-box");
    for label in price_labels {
        price_box.append_child(&Element::new("span").with_text(label));
    }

    Page {
        container,
        price_box,
        sticky_price_box,
        viewport: Viewport::new(1280.0, 800.0),
    }
}

fn attach(page: &Page, show_price: bool) -> StickyBar {
    StickyBar::attach(
        page.container.clone(),
        PageAnchors {
            add_to_cart: None,
            sticky_after: Vec::new(),
            price_box: Some(page.price_box.clone()),
            tablist: None,
        },
        &page.viewport,
        StickyBarOptions::new()
            .offset_px(THRESHOLD)
            .show_price(show_price)
            .throttle(Throttle::new(Duration::ZERO)),
    )
}

proptest! {
    /// With the throttle disabled, state always matches the last measured
    /// offset: Active iff it strictly exceeded the threshold.
    #[test]
    fn state_tracks_last_measurement(
        offsets in prop::collection::vec(0.0f64..1500.0, 1..50)
    ) {
        let page = build_page(&[]);
        let bar = attach(&page, false);

        for offset in offsets {
            page.viewport.set_scroll_top(offset);
            let last = page.viewport.scroll_top();
            let expected = if last > THRESHOLD {
                ActivationState::Active
            } else {
                ActivationState::Inactive
            };
            prop_assert_eq!(bar.state(), expected);
            prop_assert_eq!(page.container.is_visible(), last > THRESHOLD);
        }
    }

    /// The primary price box ends every deactivation with its original
    /// children in original order, across arbitrary transition sequences.
    #[test]
    fn price_round_trip_survives_any_interleaving(
        labels in prop::collection::vec("[a-z]{1,6}", 1..6),
        direct_calls in prop::collection::vec(any::<bool>(), 0..30)
    ) {
        let page = build_page(&labels);
        let bar = attach(&page, true);
        let original = page.price_box.children();

        for call_activate in direct_calls {
            if call_activate {
                bar.activate();
                prop_assert_eq!(&page.sticky_price_box.children(), &original);
            } else {
                bar.deactivate();
                prop_assert_eq!(&page.price_box.children(), &original);
                prop_assert_eq!(page.sticky_price_box.child_count(), 0);
            }
        }

        bar.deactivate();
        prop_assert_eq!(&page.price_box.children(), &original);
        prop_assert_eq!(page.sticky_price_box.child_count(), 0);
    }

    /// Scroll-driven transitions preserve the same round-trip contract.
    #[test]
    fn price_round_trip_under_scrolling(
        labels in prop::collection::vec("[a-z]{1,6}", 1..6),
        offsets in prop::collection::vec(0.0f64..1500.0, 1..40)
    ) {
        let page = build_page(&labels);
        let bar = attach(&page, true);
        let original = page.price_box.children();

        for offset in offsets {
            page.viewport.set_scroll_top(offset);
        }

        bar.deactivate();
        prop_assert_eq!(&page.price_box.children(), &original);
        prop_assert_eq!(page.sticky_price_box.child_count(), 0);
    }
}
