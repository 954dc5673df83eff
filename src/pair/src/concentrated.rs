//! Pair-side driver for the concentrated satellite pool.
//!
//! The satellite holds a small inventory and fills trades at the pair's last
//! marginal price. After each one-sided swap the pair sells the satellite a
//! slice of the swap's output token, paid in the input token at the curve's
//! own fee-free rate, so the pair invariant never shrinks. The slice is capped
//! at `reserve_out * fee / 2`, which keeps the price move caused by a
//! rebalance below the fee a round trip would pay.

use soroban_sdk::{log, token, Env};

use crate::errors::PairError;
use crate::events;
use crate::interfaces::ConcentratedPairClient;
use crate::math::{Curve, BPS_DENOMINATOR};
use crate::storage::PairStorage;

/// Share of both reserves moved into the satellite when it is switched on.
pub const SEED_BPS: i128 = 100;
/// Share of a swap's output offered to the satellite afterwards.
pub const REBALANCE_SHARE_BPS: i128 = 5_000;

pub fn seed_amounts(reserve_0: i128, reserve_1: i128) -> (i128, i128) {
    (
        reserve_0 * SEED_BPS / BPS_DENOMINATOR,
        reserve_1 * SEED_BPS / BPS_DENOMINATOR,
    )
}

pub fn rebalance_slice(amount_out: i128, reserve_out: i128, fee_bps: u32) -> i128 {
    let by_trade = amount_out.max(0) * REBALANCE_SHARE_BPS / BPS_DENOMINATOR;
    let cap = reserve_out.max(0) * fee_bps as i128 / (2 * BPS_DENOMINATOR);
    by_trade.min(cap)
}

pub fn client<'a>(env: &'a Env, pair: &PairStorage) -> ConcentratedPairClient<'a> {
    ConcentratedPairClient::new(env, &pair.concentrated_pair)
}

/// Satellite inventory, zero while it is switched off.
pub fn reserves(env: &Env, pair: &PairStorage) -> (i128, i128) {
    if !pair.concentrated_enabled {
        return (0, 0);
    }
    client(env, pair).get_reserves()
}

/// Moves the seed inventory over and opens the satellite at the current
/// marginal price. Returns the pair balances afterwards.
pub fn enable(env: &Env, pair: &PairStorage, curve: &Curve) -> Result<(i128, i128, i128), PairError> {
    if pair.reserve_0 <= 0 || pair.reserve_1 <= 0 {
        return Err(PairError::InsufficientLiquidity);
    }
    let this = env.current_contract_address();
    let (seed_0, seed_1) = seed_amounts(pair.reserve_0, pair.reserve_1);
    if seed_0 > 0 {
        token::Client::new(env, &pair.token_0).transfer(&this, &pair.concentrated_pair, &seed_0);
    }
    if seed_1 > 0 {
        token::Client::new(env, &pair.token_1).transfer(&this, &pair.concentrated_pair, &seed_1);
    }
    let balance_0 = token::Client::new(env, &pair.token_0).balance(&this);
    let balance_1 = token::Client::new(env, &pair.token_1).balance(&this);
    let price = curve.marginal_price(env, balance_0, balance_1)?;
    client(env, pair).set_enabled(&this, &true, &price);
    Ok((balance_0, balance_1, price))
}

/// Shuts the satellite and pulls its inventory back. Returns the pair
/// balances afterwards.
pub fn disable(env: &Env, pair: &PairStorage) -> (i128, i128) {
    let this = env.current_contract_address();
    client(env, pair).set_enabled(&this, &false, &0);
    log!(env, "concentrated pool disabled");
    (
        token::Client::new(env, &pair.token_0).balance(&this),
        token::Client::new(env, &pair.token_1).balance(&this),
    )
}

/// Trades a bounded slice between pair and satellite after a one-sided swap
/// and returns the pair balances afterwards.
#[allow(clippy::too_many_arguments)]
pub fn rebalance(
    env: &Env,
    pair: &PairStorage,
    curve: &Curve,
    zero_for_one: bool,
    amount_out: i128,
    fee_bps: u32,
    balance_0: i128,
    balance_1: i128,
) -> Result<(i128, i128), PairError> {
    let satellite = client(env, pair);
    let (sat_0, sat_1) = satellite.get_reserves();
    let (reserve_in, reserve_out, inventory_in) = if zero_for_one {
        (balance_0, balance_1, sat_0)
    } else {
        (balance_1, balance_0, sat_1)
    };

    let mut slice = rebalance_slice(amount_out, reserve_out, fee_bps);
    if slice <= 0 || inventory_in <= 0 {
        return Ok((balance_0, balance_1));
    }
    let mut payment = curve.amount_in(env, slice, reserve_in, reserve_out, zero_for_one)?;
    if payment > inventory_in {
        payment = inventory_in;
        slice = curve.amount_out(env, payment, reserve_in, reserve_out, zero_for_one)?;
    }
    if slice <= 0 {
        return Ok((balance_0, balance_1));
    }
    log!(env, "rebalance slice", slice, payment);

    let this = env.current_contract_address();
    let (token_out, pay_0, pay_1) = if zero_for_one {
        (&pair.token_1, payment, 0)
    } else {
        (&pair.token_0, 0, payment)
    };
    token::Client::new(env, token_out).transfer(&this, &pair.concentrated_pair, &slice);
    satellite.withdraw(&this, &this, &pay_0, &pay_1);
    satellite.sync(&this);

    let balances = if zero_for_one {
        (balance_0 + payment, balance_1 - slice)
    } else {
        (balance_0 - slice, balance_1 + payment)
    };
    events::Rebalance {
        zero_for_one,
        amount_in: payment,
        amount_out: slice,
        price: curve.marginal_price(env, balances.0, balances.1)?,
    }
    .publish(env);
    Ok(balances)
}

/// Points the satellite at the pair's current marginal price.
pub fn refresh_price(env: &Env, pair: &PairStorage, curve: &Curve) -> Result<i128, PairError> {
    let price = curve.marginal_price(env, pair.reserve_0, pair.reserve_1)?;
    if price > 0 {
        client(env, pair).set_price(&env.current_contract_address(), &price);
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_takes_one_percent() {
        assert_eq!(seed_amounts(1_000_000, 50_000), (10_000, 500));
        assert_eq!(seed_amounts(99, 99), (0, 0));
    }

    #[test]
    fn slice_is_half_the_output_when_small() {
        assert_eq!(rebalance_slice(1_000, 10_000_000, 30), 500);
    }

    #[test]
    fn slice_is_capped_by_fee_share_of_reserve() {
        // cap = 10_000_000 * 30 / 20_000 = 15_000
        assert_eq!(rebalance_slice(1_000_000, 10_000_000, 30), 15_000);
        assert_eq!(rebalance_slice(1_000_000, 10_000_000, 0), 0);
    }

    #[test]
    fn slice_never_negative() {
        assert_eq!(rebalance_slice(-5, 10_000, 30), 0);
        assert_eq!(rebalance_slice(5, -10_000, 30), 0);
    }
}
