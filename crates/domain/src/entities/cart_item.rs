use serde::{Deserialize, Serialize};

use super::bilingual::BilingualText;

/// Quantity rule set attached to every catalog item.
///
/// Weighed goods move in quarter-kilo steps; counted goods move in whole
/// pieces. The legal range and increment for every mutation derive from
/// this enum alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasurementUnit {
    Weight,
    Piece,
}

impl MeasurementUnit {
    /// Smallest quantity an item of this unit may hold in a cart.
    pub fn minimum(&self) -> f64 {
        match self {
            MeasurementUnit::Weight => 0.25,
            MeasurementUnit::Piece => 1.0,
        }
    }

    /// Increment applied by the stepper buttons.
    pub fn step(&self) -> f64 {
        match self {
            MeasurementUnit::Weight => 0.25,
            MeasurementUnit::Piece => 1.0,
        }
    }

    /// Whether `quantity` is expressible under this unit's rule.
    ///
    /// Weight quantities must be exact multiples of 0.25 (0.25 is exact in
    /// binary floating point, so the multiple test is not subject to
    /// rounding noise). Piece quantities must be integral.
    pub fn is_legal(&self, quantity: f64) -> bool {
        if quantity < self.minimum() {
            return false;
        }
        match self {
            MeasurementUnit::Weight => (quantity * 4.0).fract() == 0.0,
            MeasurementUnit::Piece => quantity.fract() == 0.0,
        }
    }

    /// Nearest legal value to `raw`, used as the suggestion when a typed
    /// quantity is rejected.
    pub fn nearest_legal(&self, raw: f64) -> f64 {
        let snapped = match self {
            MeasurementUnit::Weight => (raw * 4.0).round() / 4.0,
            MeasurementUnit::Piece => raw.round(),
        };
        if snapped < self.minimum() {
            self.minimum()
        } else {
            snapped
        }
    }

    /// Largest legal value not exceeding `bound`, used when clamping to
    /// available stock.
    pub fn floor_to_legal(&self, bound: f64) -> f64 {
        let snapped = match self {
            MeasurementUnit::Weight => (bound * 4.0).floor() / 4.0,
            MeasurementUnit::Piece => bound.floor(),
        };
        if snapped < self.minimum() {
            self.minimum()
        } else {
            snapped
        }
    }
}

/// One line of a cart.
///
/// Descriptive fields (`category_name`, `name`, `image`) are catalog
/// snapshots and non-authoritative. `points` and `price` are copied at
/// add-time and not re-validated per mutation. `stock` is the catalog
/// snapshot consulted by the cheap availability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub category_id: String,
    pub category_name: BilingualText,
    pub name: BilingualText,
    pub image: String,
    pub points: f64,
    pub price: f64,
    pub measurement_unit: MeasurementUnit,
    pub quantity: f64,
    pub stock: f64,
}

impl CartItem {
    /// Display name in English, for log and notification text.
    pub fn label(&self) -> &str {
        &self.name.en
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_legal_quantities() {
        let unit = MeasurementUnit::Weight;
        assert!(unit.is_legal(0.25));
        assert!(unit.is_legal(1.75));
        assert!(!unit.is_legal(0.2));
        assert!(!unit.is_legal(0.3));
        assert!(!unit.is_legal(0.0));
    }

    #[test]
    fn piece_legal_quantities() {
        let unit = MeasurementUnit::Piece;
        assert!(unit.is_legal(1.0));
        assert!(unit.is_legal(7.0));
        assert!(!unit.is_legal(0.0));
        assert!(!unit.is_legal(2.5));
    }

    #[test]
    fn nearest_legal_snaps_weight_to_quarter() {
        let unit = MeasurementUnit::Weight;
        assert_eq!(unit.nearest_legal(0.3), 0.25);
        assert_eq!(unit.nearest_legal(0.4), 0.5);
        assert_eq!(unit.nearest_legal(0.1), 0.25);
        assert_eq!(unit.nearest_legal(1.13), 1.25);
    }

    #[test]
    fn nearest_legal_snaps_piece_to_integer() {
        let unit = MeasurementUnit::Piece;
        assert_eq!(unit.nearest_legal(2.4), 2.0);
        assert_eq!(unit.nearest_legal(0.2), 1.0);
    }

    #[test]
    fn floor_to_legal_never_exceeds_bound_above_minimum() {
        assert_eq!(MeasurementUnit::Weight.floor_to_legal(1.9), 1.75);
        assert_eq!(MeasurementUnit::Piece.floor_to_legal(3.7), 3.0);
    }
}
