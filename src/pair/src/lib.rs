#![no_std]

mod concentrated;
mod errors;
mod events;
mod interfaces;
mod math;
mod oracle;
mod share;
mod storage;

#[cfg(test)]
extern crate std;


use soroban_sdk::{contract, contractimpl, token, Address, Bytes, Env, IntoVal, String};

pub use crate::errors::PairError;
pub use crate::interfaces::{SwapCallee, SwapCalleeClient};
pub use crate::oracle::Observation;
pub use crate::storage::CurveKind;

use crate::interfaces::{ConcentratedPairClient, FactoryClient};
use crate::math::{Curve, BPS_DENOMINATOR, PRECISION};
use crate::share::MINIMUM_LIQUIDITY;
use crate::storage::{FeeState, PairStorage, DEFAULT_SWAP_FEE_BPS, MAX_SWAP_FEE_BPS};

fn zero_address(env: &Env) -> Address {
    // The all-zero ed25519 key; nobody can sign for it, so shares sent here are locked.
    Address::from_string(&String::from_str(
        env,
        "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF",
    ))
}

fn is_zero_address(env: &Env, address: &Address) -> bool {
    address == &zero_address(env)
}

fn balances(env: &Env, pair: &PairStorage) -> (i128, i128) {
    let this = env.current_contract_address();
    (
        token::Client::new(env, &pair.token_0).balance(&this),
        token::Client::new(env, &pair.token_1).balance(&this),
    )
}

fn direction(pair: &PairStorage, token_in: &Address) -> Result<bool, PairError> {
    if *token_in == pair.token_0 {
        Ok(true)
    } else if *token_in == pair.token_1 {
        Ok(false)
    } else {
        Err(PairError::InvalidToken)
    }
}

/// Cumulative prices as they would read at `now`.
fn accrue_prices(env: &Env, pair: &PairStorage, now: u64) -> Result<(u128, u128), PairError> {
    let elapsed = now.saturating_sub(pair.block_timestamp_last) as u128;
    let mut cumulative_0 = pair.price_0_cumulative_last;
    let mut cumulative_1 = pair.price_1_cumulative_last;
    if elapsed > 0 && pair.reserve_0 > 0 && pair.reserve_1 > 0 {
        let price_0 = Curve::of(pair).marginal_price(env, pair.reserve_0, pair.reserve_1)?;
        if price_0 > 0 {
            let price_1 = math::mul_div(env, PRECISION, PRECISION, price_0)?;
            cumulative_0 = cumulative_0.wrapping_add((price_0 as u128).wrapping_mul(elapsed));
            cumulative_1 = cumulative_1.wrapping_add((price_1 as u128).wrapping_mul(elapsed));
        }
    }
    Ok((cumulative_0, cumulative_1))
}

/// Moves tracked reserves to `balance_*`, accruing prices and observations
/// for the interval the old reserves were in effect.
fn update(
    env: &Env,
    pair: &mut PairStorage,
    balance_0: i128,
    balance_1: i128,
    volume_0: i128,
    volume_1: i128,
) -> Result<(), PairError> {
    if balance_0 < 0 || balance_1 < 0 {
        return Err(PairError::InvalidAmount);
    }
    let now = env.ledger().timestamp();
    let (cumulative_0, cumulative_1) = accrue_prices(env, pair, now)?;
    oracle::record(env, pair.reserve_0, pair.reserve_1, volume_0, volume_1, now)?;

    pair.price_0_cumulative_last = cumulative_0;
    pair.price_1_cumulative_last = cumulative_1;
    pair.reserve_0 = balance_0;
    pair.reserve_1 = balance_1;
    pair.block_timestamp_last = now;
    storage::write_pair(env, pair);

    events::Sync {
        reserve_0: balance_0,
        reserve_1: balance_1,
    }
    .publish(env);
    Ok(())
}

fn swap_locked(
    env: &Env,
    amount_0_out: i128,
    amount_1_out: i128,
    to: &Address,
    data: &Bytes,
) -> Result<(), PairError> {
    let mut pair = storage::read_pair(env)?;
    if FactoryClient::new(env, &pair.factory).is_paused() {
        return Err(PairError::Paused);
    }
    if amount_0_out < 0 || amount_1_out < 0 {
        return Err(PairError::InvalidAmount);
    }
    if amount_0_out == 0 && amount_1_out == 0 {
        return Err(PairError::InsufficientOutputAmount);
    }
    if *to == pair.token_0 || *to == pair.token_1 {
        return Err(PairError::InvalidTo);
    }

    let curve = Curve::of(&pair);
    let mut fee_state = storage::read_fee_state(env)?;
    let this = env.current_contract_address();

    // The satellite fills what it can at its price; the curve covers the rest.
    // Flash swaps settle on the curve alone, so they may repay in either token.
    let use_satellite = pair.concentrated_enabled && data.is_empty();
    let (sat_in_0, sat_in_1, curve_out_0, curve_out_1) = if use_satellite {
        concentrated::client(env, &pair).get_amount_in(&amount_0_out, &amount_1_out)
    } else {
        (0, 0, amount_0_out, amount_1_out)
    };
    if curve_out_0 >= pair.reserve_0 || curve_out_1 >= pair.reserve_1 {
        return Err(PairError::InsufficientLiquidity);
    }

    let token_0 = token::Client::new(env, &pair.token_0);
    let token_1 = token::Client::new(env, &pair.token_1);
    if curve_out_0 > 0 {
        token_0.transfer(&this, to, &curve_out_0);
    }
    if curve_out_1 > 0 {
        token_1.transfer(&this, to, &curve_out_1);
    }
    let sat_out_0 = amount_0_out - curve_out_0;
    let sat_out_1 = amount_1_out - curve_out_1;
    if sat_out_0 > 0 || sat_out_1 > 0 {
        concentrated::client(env, &pair).withdraw(&this, to, &sat_out_0, &sat_out_1);
    }
    if !data.is_empty() {
        SwapCalleeClient::new(env, to).hook(&this, &amount_0_out, &amount_1_out, data);
    }

    let balance_0 = token_0.balance(&this);
    let balance_1 = token_1.balance(&this);
    let amount_0_in = (balance_0 - (pair.reserve_0 - curve_out_0)).max(0);
    let amount_1_in = (balance_1 - (pair.reserve_1 - curve_out_1)).max(0);
    if amount_0_in == 0 && amount_1_in == 0 {
        return Err(PairError::InsufficientInputAmount);
    }
    let fee_0 = math::fee_amount(amount_0_in, fee_state.swap_fee_bps)?;
    let fee_1 = math::fee_amount(amount_1_in, fee_state.swap_fee_bps)?;
    if amount_0_in - fee_0 < sat_in_0 || amount_1_in - fee_1 < sat_in_1 {
        return Err(PairError::InsufficientInputAmount);
    }

    // what the satellite is owed leaves the pair; the rest backs the curve
    let mut balance_0 = balance_0 - sat_in_0;
    let mut balance_1 = balance_1 - sat_in_1;
    let k_before = curve.k(env, pair.reserve_0, pair.reserve_1)?;
    let k_after = curve.k(env, balance_0 - fee_0, balance_1 - fee_1)?;
    if k_after < k_before {
        return Err(PairError::KInvariant);
    }

    if sat_in_0 > 0 {
        token_0.transfer(&this, &pair.concentrated_pair, &sat_in_0);
    }
    if sat_in_1 > 0 {
        token_1.transfer(&this, &pair.concentrated_pair, &sat_in_1);
    }
    if sat_in_0 > 0 || sat_in_1 > 0 {
        concentrated::client(env, &pair).sync(&this);
    }

    if fee_0 > 0 || fee_1 > 0 {
        fee_state.fees_0 = fee_state
            .fees_0
            .checked_add(fee_0)
            .ok_or(PairError::Overflow)?;
        fee_state.fees_1 = fee_state
            .fees_1
            .checked_add(fee_1)
            .ok_or(PairError::Overflow)?;
        storage::write_fee_state(env, &fee_state);
        events::Fees {
            amount_0: fee_0,
            amount_1: fee_1,
        }
        .publish(env);
    }

    if use_satellite {
        let one_sided = match (amount_0_out > 0, amount_1_out > 0) {
            (false, true) => Some((true, amount_1_out)),
            (true, false) => Some((false, amount_0_out)),
            _ => None,
        };
        if let Some((zero_for_one, amount_out)) = one_sided {
            (balance_0, balance_1) = concentrated::rebalance(
                env,
                &pair,
                &curve,
                zero_for_one,
                amount_out,
                fee_state.swap_fee_bps,
                balance_0,
                balance_1,
            )?;
        }
    }

    update(env, &mut pair, balance_0, balance_1, amount_0_in, amount_1_in)?;
    if pair.concentrated_enabled {
        concentrated::refresh_price(env, &pair, &curve)?;
    }

    events::Swap {
        to: to.clone(),
        amount_0_in,
        amount_1_in,
        amount_0_out,
        amount_1_out,
    }
    .publish(env);
    Ok(())
}

#[contract]
pub struct Pair;

#[contractimpl]
impl Pair {
    pub fn initialize(
        env: Env,
        factory: Address,
        token_a: Address,
        token_b: Address,
        stable: bool,
        concentrated_pair: Address,
    ) -> Result<(), PairError> {
        // Double-init guard
        if storage::is_initialized(&env) {
            return Err(PairError::AlreadyInitialized);
        }

        if is_zero_address(&env, &factory)
            || is_zero_address(&env, &token_a)
            || is_zero_address(&env, &token_b)
            || is_zero_address(&env, &concentrated_pair)
        {
            return Err(PairError::ZeroAddress);
        }
        if token_a == token_b {
            return Err(PairError::IdenticalTokens);
        }
        factory.require_auth();

        let (token_0, token_1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let decimals_0 = math::pow10(token::Client::new(&env, &token_0).decimals())?;
        let decimals_1 = math::pow10(token::Client::new(&env, &token_1).decimals())?;
        let now = env.ledger().timestamp();

        let pair = PairStorage {
            factory,
            token_0: token_0.clone(),
            token_1: token_1.clone(),
            concentrated_pair: concentrated_pair.clone(),
            concentrated_enabled: false,
            curve: if stable {
                CurveKind::Stable
            } else {
                CurveKind::Volatile
            },
            decimals_0,
            decimals_1,
            reserve_0: 0,
            reserve_1: 0,
            block_timestamp_last: now,
            price_0_cumulative_last: 0,
            price_1_cumulative_last: 0,
            total_supply: 0,
        };
        storage::write_pair(&env, &pair);
        storage::write_fee_state(
            &env,
            &FeeState {
                swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
                fees_0: 0,
                fees_1: 0,
            },
        );
        storage::release_lock(&env);
        oracle::initialize(&env, now);

        ConcentratedPairClient::new(&env, &concentrated_pair).initialize(
            &env.current_contract_address(),
            &token_0,
            &token_1,
        );

        storage::bump_instance(&env);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Liquidity

    /// Issues shares for the tokens sent to the pair since the last sync.
    pub fn mint(env: Env, to: Address) -> Result<i128, PairError> {
        storage::non_reentrant(&env, || {
            let mut pair = storage::read_pair(&env)?;
            let (balance_0, balance_1) = balances(&env, &pair);
            let amount_0 = balance_0 - pair.reserve_0;
            let amount_1 = balance_1 - pair.reserve_1;
            if amount_0 < 0 || amount_1 < 0 {
                return Err(PairError::InvalidAmount);
            }

            let liquidity = if pair.total_supply == 0 {
                let root = math::sqrt_product(&env, amount_0, amount_1)?;
                if root <= MINIMUM_LIQUIDITY {
                    return Err(PairError::InsufficientLiquidityMinted);
                }
                share::mint_shares(&env, &mut pair, &zero_address(&env), MINIMUM_LIQUIDITY)?;
                root - MINIMUM_LIQUIDITY
            } else {
                let (sat_0, sat_1) = concentrated::reserves(&env, &pair);
                let by_0 = math::mul_div(&env, amount_0, pair.total_supply, pair.reserve_0 + sat_0)?;
                let by_1 = math::mul_div(&env, amount_1, pair.total_supply, pair.reserve_1 + sat_1)?;
                by_0.min(by_1)
            };
            if liquidity <= 0 {
                return Err(PairError::InsufficientLiquidityMinted);
            }

            share::mint_shares(&env, &mut pair, &to, liquidity)?;
            update(&env, &mut pair, balance_0, balance_1, 0, 0)?;
            events::Mint {
                to: to.clone(),
                amount_0,
                amount_1,
                liquidity,
            }
            .publish(&env);
            Ok(liquidity)
        })
    }

    /// Redeems the shares held by the pair itself, pro rata across the pair
    /// and the satellite inventory.
    pub fn burn(env: Env, to: Address) -> Result<(i128, i128), PairError> {
        storage::non_reentrant(&env, || {
            let mut pair = storage::read_pair(&env)?;
            let this = env.current_contract_address();
            let (balance_0, balance_1) = balances(&env, &pair);
            let liquidity = share::balance_of(&env, &this);
            if pair.total_supply <= 0 {
                return Err(PairError::InsufficientLiquidityBurned);
            }
            let (sat_0, sat_1) = concentrated::reserves(&env, &pair);
            let supply = pair.total_supply;
            let amount_0 = math::mul_div(&env, liquidity, balance_0, supply)?;
            let amount_1 = math::mul_div(&env, liquidity, balance_1, supply)?;
            let sat_amount_0 = math::mul_div(&env, liquidity, sat_0, supply)?;
            let sat_amount_1 = math::mul_div(&env, liquidity, sat_1, supply)?;
            if amount_0 + sat_amount_0 <= 0 || amount_1 + sat_amount_1 <= 0 {
                return Err(PairError::InsufficientLiquidityBurned);
            }

            share::burn_shares(&env, &mut pair, &this, liquidity)?;
            if amount_0 > 0 {
                token::Client::new(&env, &pair.token_0).transfer(&this, &to, &amount_0);
            }
            if amount_1 > 0 {
                token::Client::new(&env, &pair.token_1).transfer(&this, &to, &amount_1);
            }
            if sat_amount_0 > 0 || sat_amount_1 > 0 {
                concentrated::client(&env, &pair).withdraw(&this, &to, &sat_amount_0, &sat_amount_1);
            }

            let (balance_0, balance_1) = balances(&env, &pair);
            update(&env, &mut pair, balance_0, balance_1, 0, 0)?;
            let amount_0 = amount_0 + sat_amount_0;
            let amount_1 = amount_1 + sat_amount_1;
            events::Burn {
                to: to.clone(),
                amount_0,
                amount_1,
                liquidity,
            }
            .publish(&env);
            Ok((amount_0, amount_1))
        })
    }

    // ---------------------------------------------------------------------
    // Trading

    /// Sends the requested outputs to `to` before checking the input, so the
    /// input may be paid from `to`'s `hook` when `data` is not empty.
    pub fn swap(
        env: Env,
        amount_0_out: i128,
        amount_1_out: i128,
        to: Address,
        data: Bytes,
    ) -> Result<(), PairError> {
        storage::non_reentrant(&env, || {
            swap_locked(&env, amount_0_out, amount_1_out, &to, &data)
        })
    }

    /// Sends balances above the tracked reserves to `to`.
    pub fn skim(env: Env, to: Address) -> Result<(), PairError> {
        storage::non_reentrant(&env, || {
            let pair = storage::read_pair(&env)?;
            let this = env.current_contract_address();
            let (balance_0, balance_1) = balances(&env, &pair);
            let excess_0 = balance_0 - pair.reserve_0;
            let excess_1 = balance_1 - pair.reserve_1;
            if excess_0 > 0 {
                token::Client::new(&env, &pair.token_0).transfer(&this, &to, &excess_0);
            }
            if excess_1 > 0 {
                token::Client::new(&env, &pair.token_1).transfer(&this, &to, &excess_1);
            }
            Ok(())
        })
    }

    pub fn sync(env: Env) -> Result<(), PairError> {
        storage::non_reentrant(&env, || {
            let mut pair = storage::read_pair(&env)?;
            let (balance_0, balance_1) = balances(&env, &pair);
            update(&env, &mut pair, balance_0, balance_1, 0, 0)
        })
    }

    pub fn get_amount_out(env: Env, amount_in: i128, token_in: Address) -> Result<i128, PairError> {
        if amount_in < 0 {
            return Err(PairError::InvalidAmount);
        }
        let pair = storage::read_pair(&env)?;
        let zero_for_one = direction(&pair, &token_in)?;
        let fee_state = storage::read_fee_state(&env)?;
        let net = amount_in - math::fee_amount(amount_in, fee_state.swap_fee_bps)?;

        let (sat_out, remaining) = if pair.concentrated_enabled {
            concentrated::client(&env, &pair).get_amount_out(&net, &token_in)
        } else {
            (0, net)
        };
        let (reserve_in, reserve_out) = if zero_for_one {
            (pair.reserve_0, pair.reserve_1)
        } else {
            (pair.reserve_1, pair.reserve_0)
        };
        let curve_out =
            Curve::of(&pair).amount_out(&env, remaining, reserve_in, reserve_out, zero_for_one)?;
        Ok(sat_out + curve_out)
    }

    /// Gross input (fee included) needed to receive `amount_out` of `token_out`.
    pub fn get_amount_in(env: Env, amount_out: i128, token_out: Address) -> Result<i128, PairError> {
        if amount_out < 0 {
            return Err(PairError::InvalidAmount);
        }
        let pair = storage::read_pair(&env)?;
        let zero_for_one = !direction(&pair, &token_out)?;
        let fee_state = storage::read_fee_state(&env)?;
        let (amount_0_out, amount_1_out) = if zero_for_one {
            (0, amount_out)
        } else {
            (amount_out, 0)
        };

        let (sat_in_0, sat_in_1, rem_0, rem_1) = if pair.concentrated_enabled {
            concentrated::client(&env, &pair).get_amount_in(&amount_0_out, &amount_1_out)
        } else {
            (0, 0, amount_0_out, amount_1_out)
        };
        let (sat_in, curve_out, reserve_in, reserve_out) = if zero_for_one {
            (sat_in_0, rem_1, pair.reserve_0, pair.reserve_1)
        } else {
            (sat_in_1, rem_0, pair.reserve_1, pair.reserve_0)
        };
        let curve_in =
            Curve::of(&pair).amount_in(&env, curve_out, reserve_in, reserve_out, zero_for_one)?;
        let net = sat_in + curve_in;
        let keep = BPS_DENOMINATOR - fee_state.swap_fee_bps as i128;
        let scaled = net.checked_mul(BPS_DENOMINATOR).ok_or(PairError::Overflow)?;
        Ok((scaled + keep - 1) / keep)
    }

    // ---------------------------------------------------------------------
    // Factory-controlled parameters

    pub fn set_swap_fee(env: Env, caller: Address, swap_fee_bps: u32) -> Result<(), PairError> {
        storage::non_reentrant(&env, || {
            let pair = storage::read_pair(&env)?;
            if caller != pair.factory {
                return Err(PairError::NotFactory);
            }
            caller.require_auth();
            if swap_fee_bps > MAX_SWAP_FEE_BPS {
                return Err(PairError::FeeTooHigh);
            }
            let mut fee_state = storage::read_fee_state(&env)?;
            fee_state.swap_fee_bps = swap_fee_bps;
            storage::write_fee_state(&env, &fee_state);
            events::SwapFeeUpdated { swap_fee_bps }.publish(&env);
            Ok(())
        })
    }

    pub fn set_concentrated_enabled(env: Env, caller: Address, enabled: bool) -> Result<(), PairError> {
        storage::non_reentrant(&env, || {
            let mut pair = storage::read_pair(&env)?;
            if caller != pair.factory {
                return Err(PairError::NotFactory);
            }
            caller.require_auth();
            if enabled == pair.concentrated_enabled {
                return Ok(());
            }

            let curve = Curve::of(&pair);
            let price = if enabled {
                let (balance_0, balance_1, price) = concentrated::enable(&env, &pair, &curve)?;
                pair.concentrated_enabled = true;
                update(&env, &mut pair, balance_0, balance_1, 0, 0)?;
                price
            } else {
                let (balance_0, balance_1) = concentrated::disable(&env, &pair);
                pair.concentrated_enabled = false;
                update(&env, &mut pair, balance_0, balance_1, 0, 0)?;
                0
            };
            events::ConcentratedToggled { enabled, price }.publish(&env);
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Views

    pub fn get_reserves(env: Env) -> Result<(i128, i128, u64), PairError> {
        let pair = storage::read_pair(&env)?;
        Ok((pair.reserve_0, pair.reserve_1, pair.block_timestamp_last))
    }

    pub fn token_0(env: Env) -> Result<Address, PairError> {
        Ok(storage::read_pair(&env)?.token_0)
    }

    pub fn token_1(env: Env) -> Result<Address, PairError> {
        Ok(storage::read_pair(&env)?.token_1)
    }

    pub fn factory(env: Env) -> Result<Address, PairError> {
        Ok(storage::read_pair(&env)?.factory)
    }

    pub fn stable(env: Env) -> Result<bool, PairError> {
        Ok(storage::read_pair(&env)?.curve == CurveKind::Stable)
    }

    pub fn swap_fee(env: Env) -> Result<u32, PairError> {
        Ok(storage::read_fee_state(&env)?.swap_fee_bps)
    }

    /// Total fees kept by the pair since creation.
    pub fn fees(env: Env) -> Result<(i128, i128), PairError> {
        let fee_state = storage::read_fee_state(&env)?;
        Ok((fee_state.fees_0, fee_state.fees_1))
    }

    pub fn is_paused(env: Env) -> Result<bool, PairError> {
        let pair = storage::read_pair(&env)?;
        Ok(FactoryClient::new(&env, &pair.factory).is_paused())
    }

    pub fn concentrated_pair(env: Env) -> Result<Address, PairError> {
        Ok(storage::read_pair(&env)?.concentrated_pair)
    }

    pub fn concentrated_enabled(env: Env) -> Result<bool, PairError> {
        Ok(storage::read_pair(&env)?.concentrated_enabled)
    }

    pub fn concentrated_price(env: Env) -> Result<i128, PairError> {
        let pair = storage::read_pair(&env)?;
        if !pair.concentrated_enabled {
            return Ok(0);
        }
        Ok(concentrated::client(&env, &pair).price())
    }

    /// Marginal price of token0 in token1, decimal-normalised, scaled by 1e18.
    pub fn last_price_0_to_1(env: Env) -> Result<i128, PairError> {
        let pair = storage::read_pair(&env)?;
        Curve::of(&pair).marginal_price(&env, pair.reserve_0, pair.reserve_1)
    }

    pub fn current_cumulative_prices(env: Env) -> Result<(u128, u128, u64), PairError> {
        let pair = storage::read_pair(&env)?;
        let now = env.ledger().timestamp();
        let (cumulative_0, cumulative_1) = accrue_prices(&env, &pair, now)?;
        Ok((cumulative_0, cumulative_1, now))
    }

    // ---------------------------------------------------------------------
    // Oracle

    pub fn observation_length(env: Env) -> Result<u32, PairError> {
        oracle::length(&env)
    }

    pub fn observation(env: Env, index: u32) -> Result<Observation, PairError> {
        oracle::get(&env, index)
    }

    pub fn last_observation(env: Env) -> Result<Observation, PairError> {
        oracle::latest(&env)
    }

    pub fn average_reserves(env: Env, from: u32, to: u32) -> Result<(i128, i128), PairError> {
        if from >= to {
            return Err(PairError::InsufficientObservations);
        }
        oracle::average_reserves(&oracle::get(&env, from)?, &oracle::get(&env, to)?)
    }

    pub fn average_volumes(env: Env, from: u32, to: u32) -> Result<(i128, i128), PairError> {
        if from >= to {
            return Err(PairError::InsufficientObservations);
        }
        oracle::volume_between(&oracle::get(&env, from)?, &oracle::get(&env, to)?)
    }

    /// Curve output for `amount_in` priced on the reserves averaged over the
    /// last `points` observations up to now. Fees and the satellite are ignored.
    pub fn quote_average(
        env: Env,
        token_in: Address,
        amount_in: i128,
        points: u32,
    ) -> Result<i128, PairError> {
        let pair = storage::read_pair(&env)?;
        let zero_for_one = direction(&pair, &token_in)?;
        let count = oracle::length(&env)?;
        if points == 0 || count <= points {
            return Err(PairError::InsufficientObservations);
        }
        let first = oracle::get(&env, count - 1 - points)?;
        let now = oracle::latest(&env)?.advance(
            pair.reserve_0,
            pair.reserve_1,
            0,
            0,
            env.ledger().timestamp(),
        );
        let (reserve_0, reserve_1) = oracle::average_reserves(&first, &now)?;
        let (reserve_in, reserve_out) = if zero_for_one {
            (reserve_0, reserve_1)
        } else {
            (reserve_1, reserve_0)
        };
        Curve::of(&pair).amount_out(&env, amount_in, reserve_in, reserve_out, zero_for_one)
    }

    // ---------------------------------------------------------------------
    // LP shares

    pub fn decimals(_env: Env) -> u32 {
        share::SHARE_DECIMALS
    }

    pub fn total_supply(env: Env) -> Result<i128, PairError> {
        Ok(storage::read_pair(&env)?.total_supply)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        share::balance_of(&env, &id)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        share::allowance(&env, &owner, &spender)
    }

    pub fn nonce(env: Env, owner: Address) -> u64 {
        share::nonce(&env, &owner)
    }

    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128) -> Result<(), PairError> {
        owner.require_auth();
        if is_zero_address(&env, &spender) {
            return Err(PairError::ZeroAddress);
        }
        if amount < 0 {
            return Err(PairError::InvalidAmount);
        }
        storage::non_reentrant(&env, || {
            share::write_allowance(&env, &owner, &spender, amount);
            Ok(())
        })
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), PairError> {
        from.require_auth();
        if is_zero_address(&env, &to) {
            return Err(PairError::ZeroAddress);
        }
        storage::non_reentrant(&env, || share::move_shares(&env, &from, &to, amount))
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), PairError> {
        spender.require_auth();
        if is_zero_address(&env, &to) {
            return Err(PairError::ZeroAddress);
        }
        storage::non_reentrant(&env, || {
            if spender != from {
                share::spend_allowance(&env, &from, &spender, amount)?;
            }
            share::move_shares(&env, &from, &to, amount)
        })
    }

    /// Approval signed off-chain by `owner` over `(spender, amount, deadline,
    /// nonce)` and submitted by anyone.
    pub fn permit(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        deadline: u64,
        nonce: u64,
    ) -> Result<(), PairError> {
        if deadline < env.ledger().timestamp() {
            return Err(PairError::Expired);
        }
        if is_zero_address(&env, &spender) {
            return Err(PairError::ZeroAddress);
        }
        if amount < 0 {
            return Err(PairError::InvalidAmount);
        }
        if nonce != share::nonce(&env, &owner) {
            return Err(PairError::InvalidSignature);
        }
        owner.require_auth_for_args((spender.clone(), amount, deadline, nonce).into_val(&env));
        storage::non_reentrant(&env, || {
            share::bump_nonce(&env, &owner);
            share::write_allowance(&env, &owner, &spender, amount);
            Ok(())
        })
    }
}
