use weekmenu_shared::shopping::{Quantity, ShoppingItem};

/// Round an amount to a practical cooking value
///
/// Rounding rules:
/// - < 2: nearest 1/4 (positive amounts never round below 1/4)
/// - 2-10: nearest 1/2
/// - >= 10: nearest whole number
///
/// The result is monotonic in its input and rounding twice changes nothing.
pub fn round_for_display(amount: f64) -> f64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0.0;
    }

    let rounded = if amount < 2.0 {
        (amount * 4.0).round() / 4.0
    } else if amount < 10.0 {
        (amount * 2.0).round() / 2.0
    } else {
        amount.round()
    };

    if rounded == 0.0 { 0.25 } else { rounded }
}

/// Format an amount as a kitchen fraction
///
/// Formats:
/// - Whole numbers: 2.0 → "2"
/// - Mixed fractions: 1.5 → "1 1/2"
/// - Pure fractions: 0.75 → "3/4"
pub fn format_amount(amount: f64) -> String {
    let rounded = round_for_display(amount);
    let whole = rounded.trunc() as u64;
    let quarters = ((rounded - rounded.trunc()) * 4.0).round() as u64;

    let fraction = match quarters {
        1 => Some("1/4"),
        2 => Some("1/2"),
        3 => Some("3/4"),
        _ => None,
    };

    match (whole, fraction) {
        (0, Some(fraction)) => fraction.to_owned(),
        (whole, Some(fraction)) => format!("{whole} {fraction}"),
        (whole, None) => whole.to_string(),
    }
}

fn format_quantity(amount: f64, unit: &str) -> String {
    if unit.is_empty() {
        format_amount(amount)
    } else {
        format!("{} {}", format_amount(amount), unit)
    }
}

/// Render a shopping line, e.g. "3 cups flour (+ 100 g)"
///
/// Items without a quantity render as the bare item name.
pub fn display_item(item: &ShoppingItem) -> String {
    let mut line = match item.amount {
        Some(amount) if amount > 0.0 => {
            format!("{} {}", format_quantity(amount, &item.unit), item.item)
        }
        _ => item.item.to_owned(),
    };

    let additional = item
        .additional_amounts
        .iter()
        .filter(|q| q.amount > 0.0)
        .map(|Quantity { amount, unit }| format_quantity(*amount, unit))
        .collect::<Vec<_>>();

    if !additional.is_empty() {
        line.push_str(&format!(" (+ {})", additional.join(", ")));
    }

    line
}
