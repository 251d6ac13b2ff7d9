use rust_decimal::{Decimal, RoundingStrategy};

/// Rupiah amounts carry no decimal places
pub const IDR_SCALE: u32 = 0;

/// Round to the nearest whole rupiah using round-half-up.
///
/// Intermediate aggregation sums stay exact; this is applied once at
/// presentation so rounding error never compounds.
pub fn round_idr(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(IDR_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a rounded amount as "Rp 1.500.000" (dotted thousands, no decimals).
///
/// Negative amounts render as "-Rp ..." so profit reports can show a loss.
pub fn format_idr(amount: Decimal) -> String {
    let rounded = round_idr(amount);
    let negative = rounded.is_sign_negative();
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Validate that an amount is a usable ledger price (non-negative)
pub fn is_valid_price(amount: Decimal) -> bool {
    amount >= Decimal::ZERO
}
