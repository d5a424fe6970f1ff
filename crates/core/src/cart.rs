//! Shopping cart state and its persisted store.
//!
//! [`Cart`] is the pure state machine: adding an item increments its quantity
//! (inserting it at 1), removing decrements it and drops the line at zero.
//! [`CartStore`] wraps a cart together with a [`SnapshotStore`] and writes the
//! full snapshot back after every mutation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{OrderTotals, PricedLine, TaxRate};
use crate::snapshot::SnapshotStore;
use crate::types::{MenuItem, MenuItemId, Price};

/// One distinct item in the cart.
///
/// Name and price are display copies taken when the item was last added;
/// checkout re-prices from the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub item_id: MenuItemId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn unit_price_display(&self) -> String {
        Price::inr(self.unit_price).display()
    }

    #[must_use]
    pub fn line_total_display(&self) -> String {
        Price::inr(self.line_total()).display()
    }
}

impl PricedLine for CartLine {
    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Cart contents keyed by menu item.
///
/// Every stored line has a quantity of at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<MenuItemId, CartLine>,
}

impl Cart {
    /// Add one unit of `item`, returning its new quantity.
    ///
    /// The line's name and price are refreshed from `item`.
    pub fn add_item(&mut self, item: &MenuItem) -> u32 {
        let line = self.lines.entry(item.id).or_insert_with(|| CartLine {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity: 0,
        });
        line.name.clone_from(&item.name);
        line.unit_price = item.price;
        line.quantity = line.quantity.saturating_add(1);
        line.quantity
    }

    /// Remove one unit of `item_id`, returning the remaining quantity.
    ///
    /// A line reaching zero is deleted. Removing an absent item is a no-op.
    pub fn remove_item(&mut self, item_id: MenuItemId) -> u32 {
        let Some(line) = self.lines.get_mut(&item_id) else {
            return 0;
        };
        if line.quantity > 1 {
            line.quantity -= 1;
            line.quantity
        } else {
            self.lines.remove(&item_id);
            0
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of `item_id` in the cart, zero when absent.
    #[must_use]
    pub fn quantity(&self, item_id: MenuItemId) -> u32 {
        self.lines.get(&item_id).map_or(0, |line| line.quantity)
    }

    /// Lines ordered by item id.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .values()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn totals(&self, tax_rate: TaxRate) -> OrderTotals {
        OrderTotals::compute(self.lines.values(), tax_rate)
    }

    /// Serialize as a JSON object keyed by item id.
    #[must_use]
    pub fn snapshot(&self) -> String {
        let keyed: BTreeMap<String, &CartLine> = self
            .lines
            .iter()
            .map(|(id, line)| (id.to_string(), line))
            .collect();
        // A map of plain structs with string keys always serializes
        serde_json::to_string(&keyed).unwrap_or_else(|_| "{}".to_owned())
    }

    /// Rebuild a cart from [`Cart::snapshot`] output.
    ///
    /// Malformed input yields an empty cart. Lines with a zero quantity are
    /// dropped.
    #[must_use]
    pub fn from_snapshot(snapshot: &str) -> Self {
        let keyed: BTreeMap<String, CartLine> = match serde_json::from_str(snapshot) {
            Ok(keyed) => keyed,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed cart snapshot");
                return Self::default();
            }
        };

        let lines = keyed
            .into_values()
            .filter(|line| line.quantity > 0)
            .map(|line| (line.item_id, line))
            .collect();
        Self { lines }
    }
}

/// A [`Cart`] bound to the store it is persisted in.
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
    cart: Cart,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Snapshot key the cart is stored under.
    pub const KEY: &'static str = "cart";

    /// Load the persisted cart, starting empty when none is stored.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the snapshot cannot be read. A snapshot
    /// that reads fine but does not parse is not an error.
    pub async fn hydrate(store: S) -> Result<Self, S::Error> {
        let cart = store
            .load(Self::KEY)
            .await?
            .map(|snapshot| Cart::from_snapshot(&snapshot))
            .unwrap_or_default();
        Ok(Self { store, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of `item` and persist.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the snapshot cannot be written.
    pub async fn add_item(&mut self, item: &MenuItem) -> Result<u32, S::Error> {
        let quantity = self.cart.add_item(item);
        self.persist().await?;
        Ok(quantity)
    }

    /// Remove one unit of `item_id` and persist.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the snapshot cannot be written.
    pub async fn remove_item(&mut self, item_id: MenuItemId) -> Result<u32, S::Error> {
        let quantity = self.cart.remove_item(item_id);
        self.persist().await?;
        Ok(quantity)
    }

    /// Empty the cart and delete its snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the snapshot cannot be removed.
    pub async fn clear(&mut self) -> Result<(), S::Error> {
        self.cart.clear();
        self.store.remove(Self::KEY).await
    }

    async fn persist(&self) -> Result<(), S::Error> {
        self.store.save(Self::KEY, self.cart.snapshot()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::snapshot::MemorySnapshotStore;
    use crate::types::CategoryId;

    fn item(id: i32, price: i64) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            category_id: CategoryId::new(1),
            name: format!("Item {id}"),
            price: Decimal::new(price, 0),
            image_key: None,
            position: 0,
            is_available: true,
        }
    }

    #[test]
    fn test_add_then_remove_leaves_empty_cart() {
        let mut cart = Cart::default();
        assert_eq!(cart.add_item(&item(7, 50)), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(MenuItemId::new(7)), 1);

        assert_eq!(cart.remove_item(MenuItemId::new(7)), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_refreshes_name_and_price() {
        let mut cart = Cart::default();
        cart.add_item(&item(1, 10));
        let mut renamed = item(1, 12);
        renamed.name = "Filter Coffee".to_owned();
        assert_eq!(cart.add_item(&renamed), 2);

        let line = cart.lines().next().unwrap();
        assert_eq!(line.name, "Filter Coffee");
        assert_eq!(line.unit_price, Decimal::new(12, 0));
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(&item(1, 10));
        assert_eq!(cart.remove_item(MenuItemId::new(2)), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_totals_at_eighteen_percent() {
        let mut cart = Cart::default();
        let a = item(1, 100);
        cart.add_item(&a);
        cart.add_item(&a);

        let totals = cart.totals(TaxRate::new(Decimal::new(18, 2)).unwrap());
        assert_eq!(totals.subtotal, Decimal::new(200, 0));
        assert_eq!(totals.tax_display(), "₹36.00");
        assert_eq!(totals.total_display(), "₹236.00");
    }

    #[test]
    fn test_snapshot_shape() {
        let mut cart = Cart::default();
        cart.add_item(&item(3, 40));
        let value: serde_json::Value = serde_json::from_str(&cart.snapshot()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"3": {"id": 3, "name": "Item 3", "price": "40", "quantity": 1}})
        );
    }

    #[test]
    fn test_malformed_snapshot_is_empty() {
        for bad in ["", "not json", "[1,2,3]", "{\"1\": {\"id\": \"x\"}}"] {
            assert!(Cart::from_snapshot(bad).is_empty(), "{bad}");
        }
    }

    #[test]
    fn test_zero_quantity_lines_are_dropped() {
        let snapshot = r#"{"1": {"id": 1, "name": "Tea", "price": "10", "quantity": 0},
                           "2": {"id": 2, "name": "Bun", "price": "15", "quantity": 2}}"#;
        let cart = Cart::from_snapshot(snapshot);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(MenuItemId::new(2)), 2);
    }

    #[tokio::test]
    async fn test_store_persists_every_mutation() {
        let mut store = CartStore::hydrate(MemorySnapshotStore::new()).await.unwrap();
        assert!(store.cart().is_empty());

        store.add_item(&item(1, 10)).await.unwrap();
        store.add_item(&item(1, 10)).await.unwrap();
        let persisted = Cart::from_snapshot(&store.store.get("cart").unwrap());
        assert_eq!(persisted.quantity(MenuItemId::new(1)), 2);

        store.remove_item(MenuItemId::new(1)).await.unwrap();
        let persisted = Cart::from_snapshot(&store.store.get("cart").unwrap());
        assert_eq!(persisted.quantity(MenuItemId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let backing = MemorySnapshotStore::new();
        let mut store = CartStore::hydrate(&backing).await.unwrap();
        store.add_item(&item(1, 10)).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.cart().is_empty());
        assert_eq!(backing.get("cart"), None);
    }

    #[tokio::test]
    async fn test_hydrate_corrupted_snapshot() {
        let backing = MemorySnapshotStore::new();
        backing.insert("cart", "{{{");
        let store = CartStore::hydrate(&backing).await.unwrap();
        assert!(store.cart().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i32),
        Remove(i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0..4i32).prop_map(Op::Add), (0..4i32).prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn test_quantities_follow_adds_minus_removes(ops in prop::collection::vec(op(), 0..64)) {
            let mut cart = Cart::default();
            let mut model: HashMap<i32, u32> = HashMap::new();

            for op in &ops {
                match *op {
                    Op::Add(id) => {
                        cart.add_item(&item(id, 10));
                        *model.entry(id).or_default() += 1;
                    }
                    Op::Remove(id) => {
                        cart.remove_item(MenuItemId::new(id));
                        let count = model.entry(id).or_default();
                        *count = count.saturating_sub(1);
                    }
                }
            }

            for id in 0..4 {
                let expected = model.get(&id).copied().unwrap_or(0);
                prop_assert_eq!(cart.quantity(MenuItemId::new(id)), expected);
            }
            prop_assert!(cart.lines().all(|line| line.quantity >= 1));
            prop_assert_eq!(Cart::from_snapshot(&cart.snapshot()), cart);
        }
    }
}
