use crate::entities::{Cart, CartItem};
use crate::errors::CartError;
use crate::services::quantity::validate_quantity;
use crate::services::InventoryService;

/// What a mutation did to the cart.
///
/// `Applied` and `Corrected` changed state and require the dirty flag to
/// be set; `Rejected` and `Noop` left the cart untouched and must not
/// schedule a save.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied,
    Corrected { applied: f64, message: String },
    Rejected { message: String, suggested: Option<f64> },
    Noop,
}

impl MutationOutcome {
    pub fn mutated(&self) -> bool {
        matches!(self, MutationOutcome::Applied | MutationOutcome::Corrected { .. })
    }
}

/// The public mutation surface of the cart.
///
/// Every call ends in either an accepted state change (the coordinator
/// then marks the cart dirty and schedules persistence) or a no-op with a
/// reported validation failure. Validation failures never travel further
/// than the returned outcome.
pub struct CartOperations {
    inventory: InventoryService,
}

impl CartOperations {
    pub fn new(inventory: InventoryService) -> Self {
        Self { inventory }
    }

    /// Add an item, or increase the existing line when the id is already
    /// present. Stock is re-fetched from the catalog before committing;
    /// an addition onto an existing line is bounded by live stock and the
    /// clamp is surfaced, never silent.
    pub async fn add(&self, cart: &mut Cart, item: CartItem) -> Result<MutationOutcome, CartError> {
        let unit = item.measurement_unit;
        if !unit.is_legal(item.quantity) {
            let suggested = unit.nearest_legal(item.quantity);
            return Ok(MutationOutcome::Rejected {
                message: format!("Invalid quantity {} for {}", item.quantity, item.label()),
                suggested: Some(suggested),
            });
        }

        if let Some(existing) = cart.get(&item.id) {
            let current = existing.quantity;
            let desired = current + item.quantity;
            if self.inventory.check_enhanced(&item, desired).await? {
                cart.add_quantity(&item.id, item.quantity);
                return Ok(MutationOutcome::Applied);
            }
            let live = self.inventory.live_stock(&item.id).await?;
            let clamped = unit.floor_to_legal(live);
            if clamped > live || clamped <= current {
                return Ok(MutationOutcome::Rejected {
                    message: format!("Only {live} of {} in stock", item.label()),
                    suggested: None,
                });
            }
            let message = format!("Only {live} of {} in stock", item.label());
            if let Some(line) = cart.get_mut(&item.id) {
                line.quantity = clamped;
                line.stock = live;
            }
            return Ok(MutationOutcome::Corrected {
                applied: clamped,
                message,
            });
        }

        if !self.inventory.check_enhanced(&item, item.quantity).await? {
            let live = self.inventory.live_stock(&item.id).await?;
            let clamped = unit.floor_to_legal(live);
            let suggested = (clamped <= live).then_some(clamped);
            return Ok(MutationOutcome::Rejected {
                message: format!("Only {live} of {} in stock", item.label()),
                suggested,
            });
        }

        cart.insert(item);
        Ok(MutationOutcome::Applied)
    }

    /// Step the line up by its unit step. Checked against the cached stock
    /// snapshot only; going past stock is rejected, not clamped.
    pub fn increase(&self, cart: &mut Cart, id: &str) -> Result<MutationOutcome, CartError> {
        let item = cart.get(id).ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
        let step = item.measurement_unit.step();
        let next = item.quantity + step;

        if !self.inventory.check_simple(item, next) {
            return Ok(MutationOutcome::Rejected {
                message: format!("Only {} of {} in stock", item.stock, item.label()),
                suggested: None,
            });
        }

        cart.add_quantity(id, step);
        Ok(MutationOutcome::Applied)
    }

    /// Step the line down by its unit step. Going below the unit minimum
    /// is rejected; the caller is expected to disable the control instead.
    pub fn decrease(&self, cart: &mut Cart, id: &str) -> Result<MutationOutcome, CartError> {
        let item = cart.get(id).ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
        let unit = item.measurement_unit;
        let next = item.quantity - unit.step();

        if next < unit.minimum() {
            return Ok(MutationOutcome::Rejected {
                message: format!("Minimum quantity for {} is {}", item.label(), unit.minimum()),
                suggested: None,
            });
        }

        cart.add_quantity(id, -unit.step());
        Ok(MutationOutcome::Applied)
    }

    /// Full validation path for free-text quantity inputs. Illegal input
    /// is auto-corrected to the nearest legal value with the reason
    /// surfaced in the outcome; live stock is consulted before committing.
    pub async fn set_quantity(
        &self,
        cart: &mut Cart,
        id: &str,
        raw: f64,
    ) -> Result<MutationOutcome, CartError> {
        let item = cart.get(id).ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
        let unit = item.measurement_unit;

        let check = validate_quantity(raw, unit, item.stock);
        let mut candidate = if check.accepted {
            raw
        } else {
            check.corrected.unwrap_or_else(|| unit.minimum())
        };
        let mut message = check.message;

        let mut refreshed_stock = None;
        if !self.inventory.check_enhanced(item, candidate).await? {
            let live = self.inventory.live_stock(id).await?;
            let clamped = unit.floor_to_legal(live);
            if clamped > live {
                // Not even the unit minimum is in stock.
                return Ok(MutationOutcome::Rejected {
                    message: format!("Only {live} of {} in stock", item.label()),
                    suggested: None,
                });
            }
            candidate = clamped;
            message = Some(format!("Only {live} of {} in stock", item.label()));
            refreshed_stock = Some(live);
        }

        if let Some(line) = cart.get_mut(id) {
            line.quantity = candidate;
            if let Some(live) = refreshed_stock {
                line.stock = live;
            }
        }

        match message {
            None => Ok(MutationOutcome::Applied),
            Some(message) => Ok(MutationOutcome::Corrected {
                applied: candidate,
                message,
            }),
        }
    }

    pub fn remove(&self, cart: &mut Cart, id: &str) -> Result<MutationOutcome, CartError> {
        match cart.remove(id) {
            Some(_) => Ok(MutationOutcome::Applied),
            None => Err(CartError::ItemNotFound(id.to_string())),
        }
    }

    pub fn clear(&self, cart: &mut Cart) -> Result<MutationOutcome, CartError> {
        if cart.is_empty() {
            return Ok(MutationOutcome::Noop);
        }
        cart.clear();
        Ok(MutationOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::entities::{BilingualText, MeasurementUnit};
    use crate::repositories::StockGateway;

    struct FixedStock(f64);

    #[async_trait]
    impl StockGateway for FixedStock {
        async fn current_stock(&self, _item_id: &str) -> Result<f64, CartError> {
            Ok(self.0)
        }
    }

    fn ops(live_stock: f64) -> CartOperations {
        CartOperations::new(InventoryService::new(Arc::new(FixedStock(live_stock))))
    }

    fn item(id: &str, unit: MeasurementUnit, quantity: f64, stock: f64) -> CartItem {
        CartItem {
            id: id.to_string(),
            category_id: "c1".to_string(),
            category_name: BilingualText::new("Fruit", "فواكه").unwrap(),
            name: BilingualText::new(id, id).unwrap(),
            image: String::new(),
            points: 1.0,
            price: 2.5,
            measurement_unit: unit,
            quantity,
            stock,
        }
    }

    #[tokio::test]
    async fn add_appends_new_line() {
        let ops = ops(10.0);
        let mut cart = Cart::new();

        let outcome = ops
            .add(&mut cart, item("apple", MeasurementUnit::Piece, 2.0, 10.0))
            .await
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(cart.get("apple").unwrap().quantity, 2.0);
    }

    #[tokio::test]
    async fn add_on_existing_id_sums_instead_of_duplicating() {
        let ops = ops(10.0);
        let mut cart = Cart::from_items(vec![item("apple", MeasurementUnit::Piece, 2.0, 10.0)]);

        let outcome = ops
            .add(&mut cart, item("apple", MeasurementUnit::Piece, 3.0, 10.0))
            .await
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("apple").unwrap().quantity, 5.0);
    }

    #[tokio::test]
    async fn add_onto_existing_line_clamps_to_live_stock_with_message() {
        let ops = ops(4.0);
        let mut cart = Cart::from_items(vec![item("apple", MeasurementUnit::Piece, 3.0, 10.0)]);

        let outcome = ops
            .add(&mut cart, item("apple", MeasurementUnit::Piece, 3.0, 10.0))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MutationOutcome::Corrected {
                applied: 4.0,
                message: "Only 4 of apple in stock".to_string(),
            }
        );
        assert_eq!(cart.get("apple").unwrap().quantity, 4.0);
    }

    #[tokio::test]
    async fn add_of_new_item_beyond_live_stock_is_rejected() {
        let ops = ops(1.0);
        let mut cart = Cart::new();

        let outcome = ops
            .add(&mut cart, item("apple", MeasurementUnit::Piece, 2.0, 10.0))
            .await
            .unwrap();

        assert!(matches!(outcome, MutationOutcome::Rejected { .. }));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn increase_at_stock_is_rejected_without_mutation() {
        let ops = ops(3.0);
        let mut cart = Cart::from_items(vec![item("apple", MeasurementUnit::Piece, 3.0, 3.0)]);

        let outcome = ops.increase(&mut cart, "apple").unwrap();

        assert!(matches!(outcome, MutationOutcome::Rejected { .. }));
        assert_eq!(cart.get("apple").unwrap().quantity, 3.0);
    }

    #[test]
    fn increase_steps_by_unit_step() {
        let ops = ops(10.0);
        let mut cart = Cart::from_items(vec![
            item("flour", MeasurementUnit::Weight, 0.5, 10.0),
            item("eggs", MeasurementUnit::Piece, 2.0, 10.0),
        ]);

        ops.increase(&mut cart, "flour").unwrap();
        ops.increase(&mut cart, "eggs").unwrap();

        assert_eq!(cart.get("flour").unwrap().quantity, 0.75);
        assert_eq!(cart.get("eggs").unwrap().quantity, 3.0);
    }

    #[test]
    fn decrease_below_minimum_is_rejected() {
        let ops = ops(10.0);
        let mut cart = Cart::from_items(vec![
            item("flour", MeasurementUnit::Weight, 0.25, 10.0),
            item("eggs", MeasurementUnit::Piece, 1.0, 10.0),
        ]);

        assert!(matches!(
            ops.decrease(&mut cart, "flour").unwrap(),
            MutationOutcome::Rejected { .. }
        ));
        assert!(matches!(
            ops.decrease(&mut cart, "eggs").unwrap(),
            MutationOutcome::Rejected { .. }
        ));
        assert_eq!(cart.get("flour").unwrap().quantity, 0.25);
        assert_eq!(cart.get("eggs").unwrap().quantity, 1.0);
    }

    #[tokio::test]
    async fn set_quantity_auto_corrects_off_grid_weight() {
        let ops = ops(10.0);
        let mut cart = Cart::from_items(vec![item("flour", MeasurementUnit::Weight, 0.5, 10.0)]);

        let outcome = ops.set_quantity(&mut cart, "flour", 0.3).await.unwrap();

        match outcome {
            MutationOutcome::Corrected { applied, .. } => assert_eq!(applied, 0.25),
            other => panic!("expected correction, got {other:?}"),
        }
        assert_eq!(cart.get("flour").unwrap().quantity, 0.25);
    }

    #[tokio::test]
    async fn set_quantity_clamps_to_live_stock() {
        let ops = ops(1.5);
        let mut cart = Cart::from_items(vec![item("flour", MeasurementUnit::Weight, 0.5, 10.0)]);

        let outcome = ops.set_quantity(&mut cart, "flour", 3.0).await.unwrap();

        match outcome {
            MutationOutcome::Corrected { applied, .. } => assert_eq!(applied, 1.5),
            other => panic!("expected correction, got {other:?}"),
        }
        assert_eq!(cart.get("flour").unwrap().stock, 1.5);
    }

    #[tokio::test]
    async fn set_quantity_on_sold_out_piece_item_is_rejected() {
        let ops = ops(0.0);
        let mut cart = Cart::from_items(vec![item("eggs", MeasurementUnit::Piece, 1.0, 10.0)]);

        let outcome = ops.set_quantity(&mut cart, "eggs", 2.0).await.unwrap();

        assert_eq!(
            outcome,
            MutationOutcome::Rejected {
                message: "Only 0 of eggs in stock".to_string(),
                suggested: None,
            }
        );
        assert_eq!(cart.get("eggs").unwrap().quantity, 1.0);
    }

    #[tokio::test]
    async fn set_quantity_below_weight_minimum_stock_is_rejected() {
        let ops = ops(0.1);
        let mut cart = Cart::from_items(vec![item("flour", MeasurementUnit::Weight, 0.5, 10.0)]);

        let outcome = ops.set_quantity(&mut cart, "flour", 1.0).await.unwrap();

        assert!(matches!(outcome, MutationOutcome::Rejected { .. }));
        assert_eq!(cart.get("flour").unwrap().quantity, 0.5);
    }

    #[tokio::test]
    async fn add_onto_existing_line_when_sold_out_is_rejected() {
        let ops = ops(0.0);
        let mut cart = Cart::from_items(vec![item("eggs", MeasurementUnit::Piece, 2.0, 10.0)]);

        let outcome = ops
            .add(&mut cart, item("eggs", MeasurementUnit::Piece, 1.0, 10.0))
            .await
            .unwrap();

        assert!(matches!(outcome, MutationOutcome::Rejected { .. }));
        assert_eq!(cart.get("eggs").unwrap().quantity, 2.0);
    }

    #[tokio::test]
    async fn add_of_new_item_when_sold_out_suggests_nothing() {
        let ops = ops(0.0);
        let mut cart = Cart::new();

        let outcome = ops
            .add(&mut cart, item("eggs", MeasurementUnit::Piece, 1.0, 10.0))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MutationOutcome::Rejected {
                message: "Only 0 of eggs in stock".to_string(),
                suggested: None,
            }
        );
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn set_quantity_accepts_legal_value() {
        let ops = ops(10.0);
        let mut cart = Cart::from_items(vec![item("eggs", MeasurementUnit::Piece, 1.0, 10.0)]);

        let outcome = ops.set_quantity(&mut cart, "eggs", 4.0).await.unwrap();

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(cart.get("eggs").unwrap().quantity, 4.0);
    }

    #[test]
    fn remove_missing_id_is_an_error() {
        let ops = ops(10.0);
        let mut cart = Cart::new();
        assert!(matches!(
            ops.remove(&mut cart, "ghost"),
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[test]
    fn clear_on_empty_cart_is_a_noop() {
        let ops = ops(10.0);
        let mut cart = Cart::new();
        assert_eq!(ops.clear(&mut cart).unwrap(), MutationOutcome::Noop);
    }
}
