//! Platform fee calculation.
//!
//! Fees are expressed in basis points of the gross amount and rounded
//! half away from zero to the currency minor unit. The net payout is
//! always derived by subtraction, so `fee + net == amount` holds exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::amount::{PaymentAmount, CURRENCY_SCALE, MAX_AMOUNT};
use crate::domain::foundation::ValidationError;

/// Upper bound for a fee rate: 100% of the gross amount.
pub const MAX_FEE_RATE_BPS: u32 = 10_000;

/// Split of a gross amount into platform fee and landlord payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
}

/// Computes the platform fee and net payout for a gross amount.
///
/// # Errors
///
/// - `InvalidFormat` if `fee_rate_bps` exceeds 10000
/// - `TooLarge` if the intermediate product does not fit a `Decimal`
pub fn compute_fee(
    amount: &PaymentAmount,
    fee_rate_bps: u32,
) -> Result<FeeBreakdown, ValidationError> {
    if fee_rate_bps > MAX_FEE_RATE_BPS {
        return Err(ValidationError::invalid_format(
            "fee_rate_bps",
            format!("must be between 0 and {}", MAX_FEE_RATE_BPS),
        ));
    }

    let gross = amount.as_decimal();
    let fee = gross
        .checked_mul(Decimal::from(fee_rate_bps))
        .and_then(|scaled| scaled.checked_div(Decimal::from(MAX_FEE_RATE_BPS)))
        .ok_or_else(|| ValidationError::too_large("amount", MAX_AMOUNT, gross))?
        .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);

    Ok(FeeBreakdown {
        fee_amount: fee,
        net_amount: gross - fee,
    })
}
