//! Change and commission arithmetic for a swap.
//!
//! Given what each side put in and what the buyer asked for, produce the
//! quantities every output must carry:
//!
//! ```text
//! commission            = floor(amount_to_pay × rate)
//! seller_proceeds       = amount_to_pay − commission
//! buyer_currency_change = Σ currency inputs − amount_to_pay
//! buyer_asset_received  = asset_amount_requested
//! seller_asset_change   = Σ asset inputs − asset_amount_requested
//! ```
//!
//! Rates are [`Decimal`] so `1000 × 0.09` is exactly `90`.

use assetswap_types::{
    OwnableState, Party, Result, StateAndRef, SwapError, TokenAmount, validate_commission_rate,
};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Everything the calculator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitInput {
    pub sum_input_currency: u64,
    pub amount_to_pay: u64,
    pub commission_rate: Decimal,
    pub sum_input_asset: u64,
    pub asset_amount_requested: u64,
}

/// Quantities of every output leg of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSplit {
    pub commission: u64,
    pub seller_proceeds: u64,
    pub buyer_currency_change: u64,
    pub buyer_asset_received: u64,
    pub seller_asset_change: u64,
}

/// Compute the split.
///
/// # Errors
/// - [`SwapError::InvalidCommissionRate`] if the rate is outside `[0, 1)`
/// - [`SwapError::InsufficientCurrencyOffered`] if currency inputs don't cover the price
/// - [`SwapError::InsufficientAssetOffered`] if asset inputs don't cover the request
pub fn compute_split(input: &SplitInput) -> Result<TradeSplit> {
    let commission = commission_for(input.amount_to_pay, input.commission_rate)?;

    let buyer_currency_change = input
        .sum_input_currency
        .checked_sub(input.amount_to_pay)
        .ok_or(SwapError::InsufficientCurrencyOffered {
            offered: input.sum_input_currency,
            required: input.amount_to_pay,
        })?;

    let seller_asset_change = input
        .sum_input_asset
        .checked_sub(input.asset_amount_requested)
        .ok_or(SwapError::InsufficientAssetOffered {
            offered: input.sum_input_asset,
            required: input.asset_amount_requested,
        })?;

    Ok(TradeSplit {
        commission,
        seller_proceeds: input.amount_to_pay - commission,
        buyer_currency_change,
        buyer_asset_received: input.asset_amount_requested,
        seller_asset_change,
    })
}

/// `floor(amount × rate)`. Never exceeds `amount` for a rate in `[0, 1)`.
///
/// # Errors
/// [`SwapError::InvalidCommissionRate`] or [`SwapError::QuantityOverflow`].
pub fn commission_for(amount: u64, rate: Decimal) -> Result<u64> {
    validate_commission_rate(rate)?;
    Decimal::from(amount)
        .checked_mul(rate)
        .and_then(|c| c.floor().to_u64())
        .ok_or(SwapError::QuantityOverflow)
}

/// Who receives each leg.
#[derive(Debug, Clone)]
pub struct TradeParties {
    pub buyer: Party,
    pub seller: Party,
    pub commission_recipient: Party,
}

/// Build the swap's output states in a fixed order:
/// asset to buyer, asset change to seller, currency to seller,
/// currency change to buyer, commission to its recipient.
///
/// Zero-quantity legs are omitted so a "paid to X" check can never be met
/// by an empty state.
#[must_use]
pub fn build_trade_outputs(
    split: &TradeSplit,
    asset: &TokenAmount,
    currency: &TokenAmount,
    parties: &TradeParties,
) -> Vec<OwnableState> {
    [
        (asset, &parties.buyer, split.buyer_asset_received),
        (asset, &parties.seller, split.seller_asset_change),
        (currency, &parties.seller, split.seller_proceeds),
        (currency, &parties.buyer, split.buyer_currency_change),
        (currency, &parties.commission_recipient, split.commission),
    ]
    .into_iter()
    .map(|(token, owner, quantity)| OwnableState::new(token.with_quantity(quantity), owner.clone()))
    .filter(|state| !state.amount.is_zero())
    .collect()
}

/// Sum the quantities of a set of states.
///
/// # Errors
/// [`SwapError::QuantityOverflow`] if the sum doesn't fit in `u64`.
pub fn sum_quantities(states: &[StateAndRef]) -> Result<u64> {
    states.iter().try_fold(0u64, |acc, s| {
        acc.checked_add(s.state.quantity())
            .ok_or(SwapError::QuantityOverflow)
    })
}
