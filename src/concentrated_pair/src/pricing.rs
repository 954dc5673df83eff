//! Fixed-price conversion between the two tokens.
//!
//! Outputs round down and inputs round up through the same [`Pricing::convert`]
//! helper, so a quoted input always buys at least the output it was quoted for.

use soroban_sdk::{Env, U256};

use crate::errors::ConcentratedError;
use crate::storage::ConcentratedStorage;

pub const PRECISION: i128 = 1_000_000_000_000_000_000;
pub const MAX_DECIMALS: u32 = 18;

pub fn pow10(decimals: u32) -> Result<i128, ConcentratedError> {
    if decimals > MAX_DECIMALS {
        return Err(ConcentratedError::InvalidToken);
    }
    10i128
        .checked_pow(decimals)
        .ok_or(ConcentratedError::Overflow)
}

fn wide(env: &Env, value: i128) -> U256 {
    U256::from_u128(env, value as u128)
}

/// `amount * n_0 * n_1 / (d_0 * d_1)` with a 256-bit intermediate.
fn scale(
    env: &Env,
    amount: i128,
    numerator: (i128, i128),
    denominator: (i128, i128),
    round_up: bool,
) -> Result<i128, ConcentratedError> {
    if amount < 0 || numerator.0 < 0 || numerator.1 < 0 {
        return Err(ConcentratedError::InvalidAmount);
    }
    if denominator.0 <= 0 || denominator.1 <= 0 {
        return Err(ConcentratedError::InvalidPrice);
    }
    let n = wide(env, amount)
        .mul(&wide(env, numerator.0))
        .mul(&wide(env, numerator.1));
    let d = wide(env, denominator.0).mul(&wide(env, denominator.1));
    let q = if round_up {
        n.add(&d).sub(&U256::from_u32(env, 1)).div(&d)
    } else {
        n.div(&d)
    };
    q.to_u128()
        .filter(|v| *v <= i128::MAX as u128)
        .map(|v| v as i128)
        .ok_or(ConcentratedError::Overflow)
}

#[derive(Clone, Debug)]
pub struct Pricing {
    pub price: i128,
    pub decimals_0: i128,
    pub decimals_1: i128,
}

impl Pricing {
    pub fn of(storage: &ConcentratedStorage) -> Self {
        Pricing {
            price: storage.price,
            decimals_0: storage.decimals_0,
            decimals_1: storage.decimals_1,
        }
    }

    /// Value of `amount` of one token in the other at `price`.
    pub fn convert(
        &self,
        env: &Env,
        amount: i128,
        from_0: bool,
        round_up: bool,
    ) -> Result<i128, ConcentratedError> {
        if from_0 {
            scale(
                env,
                amount,
                (self.price, self.decimals_1),
                (self.decimals_0, PRECISION),
                round_up,
            )
        } else {
            scale(
                env,
                amount,
                (PRECISION, self.decimals_0),
                (self.price, self.decimals_1),
                round_up,
            )
        }
    }

    /// Fills `amount_in` up to `reserve_out`. Returns the output and the part
    /// of the input left unspent once the fill hits the reserve.
    pub fn fill_out(
        &self,
        env: &Env,
        amount_in: i128,
        in_is_0: bool,
        reserve_out: i128,
    ) -> Result<(i128, i128), ConcentratedError> {
        if amount_in < 0 {
            return Err(ConcentratedError::InvalidAmount);
        }
        if self.price <= 0 || amount_in == 0 {
            return Ok((0, amount_in));
        }
        let full = self.convert(env, amount_in, in_is_0, false)?;
        let reserve_out = reserve_out.max(0);
        if full <= reserve_out {
            return Ok((full, 0));
        }
        let cost = self.convert(env, reserve_out, !in_is_0, true)?;
        Ok((reserve_out, (amount_in - cost).max(0)))
    }

    /// Input needed for `amount_out` up to `reserve_out`. Returns the input and
    /// the part of the output left unfilled.
    pub fn fill_in(
        &self,
        env: &Env,
        amount_out: i128,
        out_is_0: bool,
        reserve_out: i128,
    ) -> Result<(i128, i128), ConcentratedError> {
        if amount_out < 0 {
            return Err(ConcentratedError::InvalidAmount);
        }
        if self.price <= 0 || amount_out == 0 {
            return Ok((0, amount_out));
        }
        let filled = amount_out.min(reserve_out.max(0));
        let cost = self.convert(env, filled, out_is_0, true)?;
        Ok((cost, amount_out - filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn btc_usdc() -> Pricing {
        Pricing {
            price: 2 * PRECISION,
            decimals_0: 100_000_000,
            decimals_1: 1_000_000,
        }
    }

    #[test]
    fn converts_across_decimals() {
        let env = Env::default();
        let p = btc_usdc();
        // 1 BTC (8 dp) is 2 USDC (6 dp)
        assert_eq!(p.convert(&env, 100_000_000, true, false).unwrap(), 2_000_000);
        assert_eq!(p.convert(&env, 2_000_000, false, false).unwrap(), 100_000_000);
        // one raw unit of BTC is worth 0.02 raw USDC
        assert_eq!(p.convert(&env, 1, true, false).unwrap(), 0);
        assert_eq!(p.convert(&env, 1, true, true).unwrap(), 1);
    }

    #[test]
    fn fill_out_caps_at_reserve() {
        let env = Env::default();
        let p = btc_usdc();
        assert_eq!(p.fill_out(&env, 100_000, false, 100_000_000).unwrap(), (5_000_000, 0));
        assert_eq!(
            p.fill_out(&env, 5_000_000, false, 100_000_000).unwrap(),
            (100_000_000, 3_000_000)
        );
        assert_eq!(p.fill_out(&env, 200_000_000, true, 2_000_000).unwrap(), (2_000_000, 100_000_000));
    }

    #[test]
    fn zero_price_passes_everything_through() {
        let env = Env::default();
        let p = Pricing {
            price: 0,
            decimals_0: 10_000_000,
            decimals_1: 10_000_000,
        };
        assert_eq!(p.fill_out(&env, 1_000, true, 1_000_000).unwrap(), (0, 1_000));
        assert_eq!(p.fill_in(&env, 1_000, true, 1_000_000).unwrap(), (0, 1_000));
    }

    #[test]
    fn negative_amounts_rejected() {
        let env = Env::default();
        let p = btc_usdc();
        assert_eq!(p.fill_out(&env, -1, true, 10), Err(ConcentratedError::InvalidAmount));
        assert_eq!(p.fill_in(&env, -1, true, 10), Err(ConcentratedError::InvalidAmount));
    }

    #[test]
    fn decimals_above_eighteen_rejected() {
        assert_eq!(pow10(6), Ok(1_000_000));
        assert_eq!(pow10(19), Err(ConcentratedError::InvalidToken));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn quoted_input_buys_the_output(
            price in 1_000_000_000_000_000i128..1_000_000_000_000_000_000_000i128,
            amount_out in 1i128..1_000_000_000_000i128,
            out_is_0 in any::<bool>(),
        ) {
            let env = Env::default();
            let p = Pricing { price, decimals_0: 10_000_000, decimals_1: 1_000_000 };
            let (amount_in, remaining) = p.fill_in(&env, amount_out, out_is_0, i128::MAX / 4).unwrap();
            prop_assert_eq!(remaining, 0);
            let (filled, _) = p.fill_out(&env, amount_in, !out_is_0, i128::MAX / 4).unwrap();
            prop_assert!(filled >= amount_out);
        }
    }
}
