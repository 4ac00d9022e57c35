use serde::{Deserialize, Serialize};

use super::cart_item::CartItem;

/// The cart: a set of items keyed by item id, order-irrelevant.
///
/// Inserting an id that is already present updates the line in place;
/// duplicate ids never exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.insert(item);
        }
        cart
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Insert or replace the line for `item.id`.
    pub fn insert(&mut self, item: CartItem) {
        match self.get_mut(&item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Add `delta` to the quantity of an existing line. Returns false when
    /// the id is not present.
    pub fn add_quantity(&mut self, id: &str, delta: f64) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.quantity += delta;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}
