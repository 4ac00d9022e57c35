use crate::entities::MeasurementUnit;

/// Result of validating a requested quantity against the measurement-unit
/// rule and the stock upper bound.
///
/// Rejection is a normal outcome, not an error: the corrected value is a
/// suggestion for the caller to apply or surface, never applied silently
/// here.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityCheck {
    pub accepted: bool,
    pub corrected: Option<f64>,
    pub message: Option<String>,
}

impl QuantityCheck {
    fn accepted() -> Self {
        Self {
            accepted: true,
            corrected: None,
            message: None,
        }
    }

    fn rejected(corrected: f64, message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            corrected: Some(corrected),
            message: Some(message.into()),
        }
    }
}

/// Validate `raw` under `unit` with `stock` as the upper bound.
///
/// Weight quantities below 0.25 or off the 0.25 grid come back rejected
/// with the nearest legal value as the suggestion; piece quantities must
/// be whole numbers of at least 1. A request above stock is rejected with
/// the largest legal value still in stock.
pub fn validate_quantity(raw: f64, unit: MeasurementUnit, stock: f64) -> QuantityCheck {
    if !raw.is_finite() {
        return QuantityCheck::rejected(unit.minimum(), "Quantity must be a number");
    }

    if !unit.is_legal(raw) {
        let suggestion = unit.nearest_legal(raw);
        let message = match unit {
            MeasurementUnit::Weight => {
                format!("Weight must be at least 0.25 and a multiple of 0.25 (nearest: {suggestion})")
            }
            MeasurementUnit::Piece => {
                format!("Quantity must be a whole number of at least 1 (nearest: {suggestion})")
            }
        };
        return QuantityCheck::rejected(suggestion, message);
    }

    if raw > stock {
        let suggestion = unit.floor_to_legal(stock);
        return QuantityCheck::rejected(suggestion, format!("Only {stock} in stock"));
    }

    QuantityCheck::accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legal_weight_within_stock() {
        let check = validate_quantity(1.75, MeasurementUnit::Weight, 5.0);
        assert!(check.accepted);
        assert!(check.corrected.is_none());
    }

    #[test]
    fn rejects_off_grid_weight_with_nearest_suggestion() {
        let check = validate_quantity(0.3, MeasurementUnit::Weight, 5.0);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(0.25));
        assert!(check.message.is_some());
    }

    #[test]
    fn rejects_weight_below_minimum() {
        let check = validate_quantity(0.1, MeasurementUnit::Weight, 5.0);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(0.25));
    }

    #[test]
    fn rejects_fractional_pieces() {
        let check = validate_quantity(2.5, MeasurementUnit::Piece, 5.0);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(2.0));
    }

    #[test]
    fn rejects_above_stock_with_stock_floor() {
        let check = validate_quantity(4.0, MeasurementUnit::Piece, 3.0);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(3.0));

        let check = validate_quantity(2.0, MeasurementUnit::Weight, 1.9);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(1.75));
    }

    #[test]
    fn rejects_non_finite_input() {
        let check = validate_quantity(f64::NAN, MeasurementUnit::Piece, 3.0);
        assert!(!check.accepted);
        assert_eq!(check.corrected, Some(1.0));
    }
}
