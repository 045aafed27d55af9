#![forbid(unsafe_code)]

//! Sticky bar configuration: hierarchical boolean flags and the view over
//! them that the storefront consumes.
//!
//! Flags live in a three-tier scope hierarchy — global, website, store —
//! where a store-level value overrides its website's, which overrides the
//! global one. Absent settings are falsy, so consumers never see an unusable
//! value.
//!
//! The add-to-cart flag is additionally gated by product saleability: a
//! non-saleable product forces it false without consulting the flag source
//! at all.

use ahash::AHashMap;

// ---------------------------------------------------------------------------
// Flag paths
// ---------------------------------------------------------------------------

/// Master on/off switch.
pub const PATH_ENABLED: &str = "stickybar/general/enabled";
/// Render the product image in the bar.
pub const PATH_SHOW_IMAGE: &str = "stickybar/general/show_image";
/// Render the product name in the bar.
pub const PATH_SHOW_NAME: &str = "stickybar/general/show_name";
/// Enable the price relocation behavior.
pub const PATH_SHOW_PRICE: &str = "stickybar/general/show_price";
/// Render the SKU in the bar.
pub const PATH_SHOW_SKU: &str = "stickybar/general/show_sku";
/// Render stock status in the bar.
pub const PATH_SHOW_AVAILABILITY: &str = "stickybar/general/show_availability";
/// Render the forwarding add-to-cart control.
pub const PATH_SHOW_CART: &str = "stickybar/general/show_cart";

// ---------------------------------------------------------------------------
// Scopes and sources
// ---------------------------------------------------------------------------

/// A configuration scope in the settings hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The global (default) tier.
    Global,
    /// A website, by code.
    Website(String),
    /// A store view, by code.
    Store(String),
}

impl Scope {
    /// Store scope from any string-ish code.
    #[must_use]
    pub fn store(code: impl Into<String>) -> Self {
        Self::Store(code.into())
    }

    /// Website scope from any string-ish code.
    #[must_use]
    pub fn website(code: impl Into<String>) -> Self {
        Self::Website(code.into())
    }
}

/// Read side of the settings store: boolean flags per path and scope.
///
/// Implementations must treat absent settings as `false`.
pub trait FlagSource {
    /// Whether `path` resolves to a set flag in `scope`.
    fn is_set_flag(&self, path: &str, scope: &Scope) -> bool;
}

/// Product contract consumed by the cart-flag gate.
pub trait Saleable {
    /// Whether the product is currently purchasable.
    fn is_saleable(&self) -> bool;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory hierarchical flag store.
///
/// Resolution order for a store scope: store value, else the value of the
/// website the store is assigned to, else global, else `false`. A store with
/// no website assignment falls back straight to global.
#[derive(Debug, Default)]
pub struct SettingsStore {
    global: AHashMap<String, bool>,
    websites: AHashMap<String, AHashMap<String, bool>>,
    stores: AHashMap<String, AHashMap<String, bool>>,
    store_websites: AHashMap<String, String>,
}

impl SettingsStore {
    /// Create an empty store (every flag resolves false).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag at the global tier.
    pub fn set_global(&mut self, path: &str, value: bool) {
        self.global.insert(path.to_string(), value);
    }

    /// Set a flag for one website.
    pub fn set_website(&mut self, website: &str, path: &str, value: bool) {
        self.websites
            .entry(website.to_string())
            .or_default()
            .insert(path.to_string(), value);
    }

    /// Set a flag for one store view.
    pub fn set_store(&mut self, store: &str, path: &str, value: bool) {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(path.to_string(), value);
    }

    /// Assign a store view to a website for fallback resolution.
    pub fn assign_store(&mut self, store: &str, website: &str) {
        self.store_websites
            .insert(store.to_string(), website.to_string());
    }

    fn website_value(&self, website: &str, path: &str) -> Option<bool> {
        self.websites
            .get(website)
            .and_then(|flags| flags.get(path))
            .copied()
    }
}

impl FlagSource for SettingsStore {
    fn is_set_flag(&self, path: &str, scope: &Scope) -> bool {
        let resolved = match scope {
            Scope::Global => self.global.get(path).copied(),
            Scope::Website(code) => self
                .website_value(code, path)
                .or_else(|| self.global.get(path).copied()),
            Scope::Store(code) => self
                .stores
                .get(code)
                .and_then(|flags| flags.get(path))
                .copied()
                .or_else(|| {
                    self.store_websites
                        .get(code)
                        .and_then(|website| self.website_value(website, path))
                })
                .or_else(|| self.global.get(path).copied()),
        };
        resolved.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Configuration view
// ---------------------------------------------------------------------------

/// The configuration view the storefront consumes.
///
/// A pure read proxy over a [`FlagSource`]; no caching, no side effects.
#[derive(Debug)]
pub struct BarConfig<S> {
    source: S,
}

impl<S: FlagSource> BarConfig<S> {
    /// Wrap a flag source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Borrow the underlying flag source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether the sticky bar is enabled at all.
    #[must_use]
    pub fn is_enabled(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_ENABLED, scope)
    }

    /// Whether the bar shows the product image.
    #[must_use]
    pub fn can_show_image(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_SHOW_IMAGE, scope)
    }

    /// Whether the bar shows the product name.
    #[must_use]
    pub fn can_show_name(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_SHOW_NAME, scope)
    }

    /// Whether the bar relocates the price markup.
    #[must_use]
    pub fn can_show_price(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_SHOW_PRICE, scope)
    }

    /// Whether the bar shows the SKU.
    #[must_use]
    pub fn can_show_sku(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_SHOW_SKU, scope)
    }

    /// Whether the bar shows stock status.
    #[must_use]
    pub fn can_show_availability(&self, scope: &Scope) -> bool {
        self.source.is_set_flag(PATH_SHOW_AVAILABILITY, scope)
    }

    /// Whether the bar shows the forwarding add-to-cart control.
    ///
    /// A non-saleable product forces false; the flag source is not consulted
    /// in that case.
    #[must_use]
    pub fn can_show_cart(&self, product: &dyn Saleable, scope: &Scope) -> bool {
        product.is_saleable() && self.source.is_set_flag(PATH_SHOW_CART, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeProduct {
        saleable: bool,
    }

    impl Saleable for FakeProduct {
        fn is_saleable(&self) -> bool {
            self.saleable
        }
    }

    /// Flag source that counts lookups, standing in for a mocked provider.
    struct CountingSource {
        value: bool,
        lookups: Cell<u32>,
    }

    impl CountingSource {
        fn new(value: bool) -> Self {
            Self {
                value,
                lookups: Cell::new(0),
            }
        }
    }

    impl FlagSource for CountingSource {
        fn is_set_flag(&self, _path: &str, _scope: &Scope) -> bool {
            self.lookups.set(self.lookups.get() + 1);
            self.value
        }
    }

    #[test]
    fn is_enabled_reads_the_enabled_path() {
        let mut store = SettingsStore::new();
        store.set_global(PATH_ENABLED, true);
        let config = BarConfig::new(store);
        assert!(config.is_enabled(&Scope::Global));
        assert!(!config.can_show_image(&Scope::Global));
    }

    #[test]
    fn absent_flags_are_falsy() {
        let config = BarConfig::new(SettingsStore::new());
        let scope = Scope::store("default");
        assert!(!config.is_enabled(&scope));
        assert!(!config.can_show_name(&scope));
        assert!(!config.can_show_availability(&scope));
    }

    #[test]
    fn store_overrides_website_overrides_global() {
        let mut store = SettingsStore::new();
        store.set_global(PATH_SHOW_PRICE, true);
        store.set_website("eu", PATH_SHOW_PRICE, false);
        store.set_store("fr", PATH_SHOW_PRICE, true);
        store.assign_store("fr", "eu");
        store.assign_store("de", "eu");

        let config = BarConfig::new(store);
        // Store-level value wins.
        assert!(config.can_show_price(&Scope::store("fr")));
        // No store value: website-level override applies.
        assert!(!config.can_show_price(&Scope::store("de")));
        assert!(!config.can_show_price(&Scope::website("eu")));
        // Unassigned store falls back straight to global.
        assert!(config.can_show_price(&Scope::store("us")));
        assert!(config.can_show_price(&Scope::Global));
    }

    #[test]
    fn can_show_cart_requires_saleable_product() {
        let source = CountingSource::new(true);
        let config = BarConfig::new(source);
        let product = FakeProduct { saleable: true };

        assert!(config.can_show_cart(&product, &Scope::Global));
        assert_eq!(config.source().lookups.get(), 1);
    }

    #[test]
    fn non_saleable_product_skips_the_flag_lookup() {
        let source = CountingSource::new(true);
        let config = BarConfig::new(source);
        let product = FakeProduct { saleable: false };

        assert!(!config.can_show_cart(&product, &Scope::Global));
        assert_eq!(config.source().lookups.get(), 0);
    }

    #[test]
    fn each_accessor_reads_its_own_path() {
        let mut store = SettingsStore::new();
        store.set_global(PATH_SHOW_SKU, true);
        let config = BarConfig::new(store);

        assert!(config.can_show_sku(&Scope::Global));
        assert!(!config.can_show_price(&Scope::Global));
        assert!(!config.can_show_image(&Scope::Global));
    }
}
