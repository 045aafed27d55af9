#![forbid(unsafe_code)]

//! Retained element tree with typed handles.
//!
//! [`Element`] is a cheaply cloneable handle (`Rc` inside) over a node that
//! carries a tag, attributes, inline styles, text content, children, a
//! visibility flag, and box metrics. It is the shared mutable surface the
//! sticky bar coordinates on: the controller owns the sticky subtree and
//! borrows page-owned nodes under an explicit relocate/restore contract.
//!
//! # Design
//!
//! - Handles resolve once and are passed through typed fields; there is no
//!   selector engine. Queries are predicate walks ([`find_descendant`]).
//! - Attribute mutation notifies [`observe_attributes`] subscribers *after*
//!   the interior borrow is released, so callbacks may freely read (or
//!   mutate) the element they observe.
//! - Setting an attribute to its current value is a no-op: no notification.
//! - [`clone_deep`] copies structure only; subscribers and click handlers
//!   are never carried over to the copy.
//!
//! [`find_descendant`]: Element::find_descendant
//! [`observe_attributes`]: Element::observe_attributes
//! [`clone_deep`]: Element::clone_deep

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::subscription::{SubscriberList, Subscription};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rendered box measurements in CSS pixels.
///
/// `outer_width(true)` / `outer_height(true)` include margins, mirroring the
/// box-model reads the sticky bar performs at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxMetrics {
    /// Border-box width.
    pub width: f64,
    /// Border-box height.
    pub height: f64,
    /// Left + right margin.
    pub margin_x: f64,
    /// Top + bottom margin.
    pub margin_y: f64,
}

/// A single attribute mutation, delivered to attribute observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Attribute name.
    pub name: String,
    /// New value; `None` when the attribute was removed.
    pub value: Option<String>,
}

struct ElementState {
    tag: String,
    attributes: AHashMap<String, String>,
    styles: AHashMap<String, String>,
    text: String,
    children: Vec<Element>,
    visible: bool,
    metrics: BoxMetrics,
}

struct ElementShared {
    state: RefCell<ElementState>,
    attribute_observers: SubscriberList<AttributeChange>,
    click_handlers: SubscriberList<()>,
}

/// Handle to a retained element node.
///
/// Cloning an `Element` creates a new handle to the **same** node; equality
/// is handle identity.
pub struct Element {
    shared: Rc<ElementShared>,
}

impl Clone for Element {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Element")
            .field("tag", &state.tag)
            .field("children", &state.children.len())
            .field("visible", &state.visible)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Element {
    /// Create a detached, visible element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            shared: Rc::new(ElementShared {
                state: RefCell::new(ElementState {
                    tag: tag.into(),
                    attributes: AHashMap::new(),
                    styles: AHashMap::new(),
                    text: String::new(),
                    children: Vec::new(),
                    visible: true,
                    metrics: BoxMetrics::default(),
                }),
                attribute_observers: SubscriberList::new(),
                click_handlers: SubscriberList::new(),
            }),
        }
    }

    /// Set an attribute (builder).
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set the `class` attribute (builder).
    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        self.set_attribute("class", class);
        self
    }

    /// Set text content (builder).
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Append a child (builder).
    #[must_use]
    pub fn with_child(self, child: Element) -> Self {
        self.append_child(&child);
        self
    }

    /// Set box metrics (builder).
    #[must_use]
    pub fn with_metrics(self, metrics: BoxMetrics) -> Self {
        self.set_metrics(metrics);
        self
    }

    /// Start hidden (builder).
    #[must_use]
    pub fn hidden(self) -> Self {
        self.hide();
        self
    }
}

// ---------------------------------------------------------------------------
// Attributes, styles, text
// ---------------------------------------------------------------------------

impl Element {
    /// Tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.shared.state.borrow().tag.clone()
    }

    /// Attribute value, if set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.shared.state.borrow().attributes.get(name).cloned()
    }

    /// Set an attribute and notify observers.
    ///
    /// Setting the current value is a no-op (no notification).
    pub fn set_attribute(&self, name: &str, value: &str) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.attributes.get(name).is_some_and(|v| v == value) {
                return;
            }
            state.attributes.insert(name.to_string(), value.to_string());
        }
        self.shared.attribute_observers.notify(&AttributeChange {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
    }

    /// Remove an attribute. Returns `true` (and notifies) if it was set.
    pub fn remove_attribute(&self, name: &str) -> bool {
        let removed = self
            .shared
            .state
            .borrow_mut()
            .attributes
            .remove(name)
            .is_some();
        if removed {
            self.shared.attribute_observers.notify(&AttributeChange {
                name: name.to_string(),
                value: None,
            });
        }
        removed
    }

    /// Whether the `class` attribute contains `class` as a whitespace token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.shared
            .state
            .borrow()
            .attributes
            .get("class")
            .is_some_and(|list| list.split_whitespace().any(|token| token == class))
    }

    /// Inline style value, if set.
    #[must_use]
    pub fn style(&self, name: &str) -> Option<String> {
        self.shared.state.borrow().styles.get(name).cloned()
    }

    /// Set an inline style. Styles are layout inputs, not observed state.
    pub fn set_style(&self, name: &str, value: &str) {
        self.shared
            .state
            .borrow_mut()
            .styles
            .insert(name.to_string(), value.to_string());
    }

    /// Own text content (excluding children).
    #[must_use]
    pub fn text(&self) -> String {
        self.shared.state.borrow().text.clone()
    }

    /// Replace own text content.
    pub fn set_text(&self, text: &str) {
        self.shared.state.borrow_mut().text = text.to_string();
    }
}

// ---------------------------------------------------------------------------
// Visibility and metrics
// ---------------------------------------------------------------------------

impl Element {
    /// Make the element visible.
    pub fn show(&self) {
        self.shared.state.borrow_mut().visible = true;
    }

    /// Hide the element.
    pub fn hide(&self) {
        self.shared.state.borrow_mut().visible = false;
    }

    /// Current visibility flag.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shared.state.borrow().visible
    }

    /// Current box metrics.
    #[must_use]
    pub fn metrics(&self) -> BoxMetrics {
        self.shared.state.borrow().metrics
    }

    /// Replace box metrics (the host owns layout).
    pub fn set_metrics(&self, metrics: BoxMetrics) {
        self.shared.state.borrow_mut().metrics = metrics;
    }

    /// Border-box width, optionally including margins.
    #[must_use]
    pub fn outer_width(&self, include_margin: bool) -> f64 {
        let metrics = self.metrics();
        if include_margin {
            metrics.width + metrics.margin_x
        } else {
            metrics.width
        }
    }

    /// Border-box height, optionally including margins.
    #[must_use]
    pub fn outer_height(&self, include_margin: bool) -> f64 {
        let metrics = self.metrics();
        if include_margin {
            metrics.height + metrics.margin_y
        } else {
            metrics.height
        }
    }
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

impl Element {
    /// Snapshot of child handles, in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.shared.state.borrow().children.clone()
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.shared.state.borrow().children.len()
    }

    /// Append a child. Appending an element to itself is ignored.
    pub fn append_child(&self, child: &Element) {
        if self == child {
            return;
        }
        self.shared.state.borrow_mut().children.push(child.clone());
    }

    /// Remove a child by handle identity. Returns `true` if found.
    pub fn remove_child(&self, child: &Element) -> bool {
        let mut state = self.shared.state.borrow_mut();
        let before = state.children.len();
        state.children.retain(|existing| existing != child);
        state.children.len() < before
    }

    /// Detach and return all children, in order.
    pub fn take_children(&self) -> Vec<Element> {
        std::mem::take(&mut self.shared.state.borrow_mut().children)
    }

    /// Insert `new` immediately after `anchor` among the children.
    ///
    /// Returns `false` (and inserts nothing) when `anchor` is not a child.
    pub fn insert_after_child(&self, anchor: &Element, new: &Element) -> bool {
        let mut state = self.shared.state.borrow_mut();
        let Some(index) = state.children.iter().position(|child| child == anchor) else {
            return false;
        };
        state.children.insert(index + 1, new.clone());
        true
    }

    /// First direct child matching `predicate`.
    #[must_use]
    pub fn find_child(&self, predicate: impl Fn(&Element) -> bool) -> Option<Element> {
        self.children().into_iter().find(|child| predicate(child))
    }

    /// First descendant (depth-first, excluding self) matching `predicate`.
    #[must_use]
    pub fn find_descendant(&self, predicate: impl Fn(&Element) -> bool) -> Option<Element> {
        fn walk(node: &Element, predicate: &impl Fn(&Element) -> bool) -> Option<Element> {
            for child in node.children() {
                if predicate(&child) {
                    return Some(child);
                }
                if let Some(found) = walk(&child, predicate) {
                    return Some(found);
                }
            }
            None
        }
        walk(self, &predicate)
    }

    /// All descendants (depth-first, excluding self) matching `predicate`.
    #[must_use]
    pub fn find_descendants(&self, predicate: impl Fn(&Element) -> bool) -> Vec<Element> {
        fn walk(node: &Element, predicate: &impl Fn(&Element) -> bool, out: &mut Vec<Element>) {
            for child in node.children() {
                if predicate(&child) {
                    out.push(child.clone());
                }
                walk(&child, predicate, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &predicate, &mut out);
        out
    }

    /// Structural deep copy: tag, attributes, styles, text, metrics,
    /// visibility, and recursively copied children. Observers and click
    /// handlers are not carried over.
    #[must_use]
    pub fn clone_deep(&self) -> Element {
        let state = self.shared.state.borrow();
        let copy = Element::new(state.tag.clone());
        {
            let mut copy_state = copy.shared.state.borrow_mut();
            copy_state.attributes = state.attributes.clone();
            copy_state.styles = state.styles.clone();
            copy_state.text = state.text.clone();
            copy_state.visible = state.visible;
            copy_state.metrics = state.metrics;
        }
        for child in &state.children {
            copy.append_child(&child.clone_deep());
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

impl Element {
    /// Serialized markup of this element including its own tag.
    ///
    /// Attributes and styles render in sorted order so equal trees produce
    /// equal strings.
    #[must_use]
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    /// Serialized markup of text + children, excluding this element's tag.
    #[must_use]
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.render_contents(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        let state = self.shared.state.borrow();
        out.push('<');
        out.push_str(&state.tag);
        let mut attributes: Vec<(&String, &String)> = state.attributes.iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        if !state.styles.is_empty() {
            let mut styles: Vec<(&String, &String)> = state.styles.iter().collect();
            styles.sort_by(|a, b| a.0.cmp(b.0));
            out.push_str(" style=\"");
            for (name, value) in styles {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(value);
                out.push(';');
            }
            out.push('"');
        }
        out.push('>');
        drop(state);
        self.render_contents(out);
        let state = self.shared.state.borrow();
        out.push_str("</");
        out.push_str(&state.tag);
        out.push('>');
    }

    fn render_contents(&self, out: &mut String) {
        let (text, children) = {
            let state = self.shared.state.borrow();
            (state.text.clone(), state.children.clone())
        };
        out.push_str(&text);
        for child in &children {
            child.render(out);
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

impl Element {
    /// Register a click handler. Handlers run in registration order.
    pub fn on_click(&self, mut callback: impl FnMut() + 'static) -> Subscription {
        self.shared.click_handlers.subscribe(move |_: &()| callback())
    }

    /// Dispatch a click to all registered handlers.
    pub fn click(&self) {
        self.shared.click_handlers.notify(&());
    }

    /// Observe attribute mutations on this element.
    ///
    /// The callback runs after the mutation is committed and the interior
    /// borrow is released, so it may read (or further mutate) the element.
    pub fn observe_attributes(
        &self,
        callback: impl FnMut(&AttributeChange) + 'static,
    ) -> Subscription {
        self.shared.attribute_observers.subscribe(callback)
    }

    /// Number of live attribute observers.
    #[must_use]
    pub fn attribute_observer_count(&self) -> usize {
        self.shared.attribute_observers.len()
    }
}
