#![forbid(unsafe_code)]

//! Tab summary list for the sticky bar.
//!
//! Builds one anchor per tab-switch control found in the page's detailed
//! information region, preserving each control's link target and rendered
//! label. Built once at attach time; activate/deactivate cycles never
//! rebuild it.

use stickybar_core::Element;

/// Build the summary list from a tablist region.
///
/// Every descendant carrying `data-role="switch"` contributes one `a`
/// element with the switch's `href` and a structural copy of its label
/// content. Returns `None` when the region has no switch controls.
#[must_use]
pub fn build_summary(tablist: &Element) -> Option<Element> {
    let switches =
        tablist.find_descendants(|el| el.attribute("data-role").as_deref() == Some("switch"));
    if switches.is_empty() {
        return None;
    }

    let summary = Element::new("div").with_class("summary");
    for switch in &switches {
        let anchor = Element::new("a");
        if let Some(href) = switch.attribute("href") {
            anchor.set_attribute("href", &href);
        }
        anchor.set_text(&switch.text());
        for child in switch.children() {
            anchor.append_child(&child.clone_deep());
        }
        summary.append_child(&anchor);
    }
    Some(summary)
}
