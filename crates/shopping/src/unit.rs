use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use weekmenu_shared::shopping::Quantity;

/// Measurement family of a unit
#[derive(
    Serialize, Deserialize, EnumString, Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Volume,
    Weight,
    Count,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub family: Family,
    /// Base unit of the family ("ml", "g", "whole"), or the unit itself for `Other`
    pub canonical_unit: String,
    /// Multiplier from the classified unit to `canonical_unit`
    pub factor: f64,
}

/// Trim, lowercase and drop a trailing dot ("Tbsp." → "tbsp")
pub fn normalize_unit(unit: &str) -> String {
    unit.trim().trim_end_matches('.').trim().to_lowercase()
}

/// Classify a unit string into its measurement family
///
/// Conversion table:
/// - Volume (base ml): tsp 5, tbsp 15, fl oz 30, cup 240, l 1000
/// - Weight (base g): oz 28.35, lb 453.59, kg 1000
/// - Count (base whole): "whole", "each", "item", "piece" and unitless
///
/// Anything else is `Other` and only merges with the same literal unit.
pub fn classify(unit: &str) -> Classification {
    let normalized = normalize_unit(unit);

    let (family, canonical, factor) = match normalized.as_str() {
        "tsp" | "teaspoon" | "teaspoons" => (Family::Volume, "ml", 5.0),
        "tbsp" | "tbs" | "tablespoon" | "tablespoons" => (Family::Volume, "ml", 15.0),
        "fl oz" | "fl. oz" | "floz" | "fluid ounce" | "fluid ounces" => {
            (Family::Volume, "ml", 30.0)
        }
        "cup" | "cups" => (Family::Volume, "ml", 240.0),
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
            (Family::Volume, "ml", 1.0)
        }
        "l" | "liter" | "liters" | "litre" | "litres" => (Family::Volume, "ml", 1000.0),

        "g" | "gram" | "grams" => (Family::Weight, "g", 1.0),
        "kg" | "kilogram" | "kilograms" => (Family::Weight, "g", 1000.0),
        "oz" | "ounce" | "ounces" => (Family::Weight, "g", 28.35),
        "lb" | "lbs" | "pound" | "pounds" => (Family::Weight, "g", 453.59),

        "" | "whole" | "each" | "item" | "items" | "piece" | "pieces" => {
            (Family::Count, "whole", 1.0)
        }

        _ => {
            return Classification {
                family: Family::Other,
                canonical_unit: normalized,
                factor: 1.0,
            };
        }
    };

    Classification {
        family,
        canonical_unit: canonical.to_owned(),
        factor,
    }
}

/// Amount expressed in the canonical unit of its family
pub fn to_canonical(amount: f64, unit: &str) -> (Classification, f64) {
    let classification = classify(unit);
    let base = amount * classification.factor;

    (classification, base)
}

/// Merge two quantities when their units are compatible
///
/// Textually identical units always merge. Otherwise both units must belong
/// to the same known family; the sum is expressed in the unit of whichever
/// operand is larger once converted. Returns `None` when the quantities have
/// to be kept apart.
pub fn merge(amount_a: f64, unit_a: &str, amount_b: f64, unit_b: &str) -> Option<Quantity> {
    if normalize_unit(unit_a) == normalize_unit(unit_b) {
        return Some(Quantity {
            amount: amount_a + amount_b,
            unit: unit_a.trim().to_owned(),
        });
    }

    let (class_a, base_a) = to_canonical(amount_a, unit_a);
    let (class_b, base_b) = to_canonical(amount_b, unit_b);

    if class_a.family == Family::Other || class_a.family != class_b.family {
        return None;
    }

    let (unit, factor) = if base_a >= base_b {
        (unit_a, class_a.factor)
    } else {
        (unit_b, class_b.factor)
    };

    Some(Quantity {
        amount: (base_a + base_b) / factor,
        unit: unit.trim().to_owned(),
    })
}
