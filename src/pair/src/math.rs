//! Curve math for the pair.
//!
//! Two invariants are supported:
//!
//! * volatile: `k = x * y`
//! * stable:   `k = x * y * (x^2 + y^2)`, evaluated on reserves normalised to
//!   [`PRECISION`] so tokens with different decimals compare 1:1.
//!
//! The stable curve has no closed-form inverse; [`get_y`] solves it with a
//! bounded Newton iteration. Wide intermediates go through the host `U256`.
//! Outputs round down and inputs round up, so quoted amounts always satisfy
//! the invariant check performed by `swap`.

use soroban_sdk::{Env, U256};

use crate::errors::PairError;
use crate::storage::{CurveKind, PairStorage};

pub const PRECISION: i128 = 1_000_000_000_000_000_000;
pub const BPS_DENOMINATOR: i128 = 10_000;
pub const MAX_ITERATIONS: u32 = 255;
pub const MAX_DECIMALS: u32 = 18;

fn wide(env: &Env, value: i128) -> U256 {
    U256::from_u128(env, value as u128)
}

fn precision(env: &Env) -> U256 {
    wide(env, PRECISION)
}

fn narrow(value: &U256) -> Result<i128, PairError> {
    value
        .to_u128()
        .and_then(|v| i128::try_from(v).ok())
        .ok_or(PairError::Overflow)
}

/// `a * b / denominator` with a 256-bit intermediate, rounded down.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, PairError> {
    if a < 0 || b < 0 || denominator <= 0 {
        return Err(PairError::InvalidAmount);
    }
    narrow(&wide(env, a).mul(&wide(env, b)).div(&wide(env, denominator)))
}

/// Integer square root of `a * b`.
pub fn sqrt_product(env: &Env, a: i128, b: i128) -> Result<i128, PairError> {
    if a < 0 || b < 0 {
        return Err(PairError::InvalidAmount);
    }
    let value = wide(env, a).mul(&wide(env, b));
    let zero = U256::from_u32(env, 0);
    if value == zero {
        return Ok(0);
    }
    let one = U256::from_u32(env, 1);
    let two = U256::from_u32(env, 2);
    let mut x = value.clone();
    let mut y = x.add(&one).div(&two);
    while y < x {
        x = y.clone();
        y = x.add(&value.div(&x)).div(&two);
    }
    narrow(&x)
}

pub fn fee_amount(amount: i128, fee_bps: u32) -> Result<i128, PairError> {
    amount
        .checked_mul(fee_bps as i128)
        .map(|v| v / BPS_DENOMINATOR)
        .ok_or(PairError::Overflow)
}

pub fn pow10(decimals: u32) -> Result<i128, PairError> {
    if decimals > MAX_DECIMALS {
        return Err(PairError::InvalidToken);
    }
    10i128.checked_pow(decimals).ok_or(PairError::Overflow)
}

fn normalize(env: &Env, amount: i128, decimals: i128) -> U256 {
    wide(env, amount).mul(&precision(env)).div(&wide(env, decimals))
}

fn stable_k(env: &Env, x: &U256, y: &U256) -> U256 {
    let p = precision(env);
    let a = x.mul(y).div(&p);
    let b = x.mul(x).div(&p).add(&y.mul(y).div(&p));
    a.mul(&b).div(&p)
}

// x0 * y^3 + y * x0^3
fn f(env: &Env, x0: &U256, y: &U256) -> U256 {
    let p = precision(env);
    let y3 = y.mul(y).div(&p).mul(y).div(&p);
    let x3 = x0.mul(x0).div(&p).mul(x0).div(&p);
    x0.mul(&y3).div(&p).add(&x3.mul(y).div(&p))
}

// d/dy: 3 * x0 * y^2 + x0^3
fn d(env: &Env, x0: &U256, y: &U256) -> U256 {
    let p = precision(env);
    let three = U256::from_u32(env, 3);
    let y2 = y.mul(y).div(&p);
    let x3 = x0.mul(x0).div(&p).mul(x0).div(&p);
    three.mul(x0).mul(&y2).div(&p).add(&x3)
}

/// Solves `f(x0, y) = xy` for `y`, starting from the estimate `y`.
pub fn get_y(env: &Env, x0: &U256, xy: &U256, y: &U256) -> Result<U256, PairError> {
    let p = precision(env);
    let zero = U256::from_u32(env, 0);
    let one = U256::from_u32(env, 1);
    let mut y = y.clone();
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y.clone();
        let k = f(env, x0, &y);
        let slope = d(env, x0, &y);
        if slope == zero {
            return Err(PairError::NotConverged);
        }
        if k < *xy {
            let dy = xy.sub(&k).mul(&p).div(&slope);
            y = y.add(&dy);
        } else {
            let dy = k.sub(xy).mul(&p).div(&slope);
            if dy > y {
                return Err(PairError::NotConverged);
            }
            y = y.sub(&dy);
        }
        let delta = if y > y_prev {
            y.sub(&y_prev)
        } else {
            y_prev.sub(&y)
        };
        if delta <= one {
            return Ok(y);
        }
    }
    Err(PairError::NotConverged)
}

#[derive(Clone, Debug)]
pub struct Curve {
    pub kind: CurveKind,
    pub decimals_0: i128,
    pub decimals_1: i128,
}

impl Curve {
    pub fn of(storage: &PairStorage) -> Self {
        Curve {
            kind: storage.curve,
            decimals_0: storage.decimals_0,
            decimals_1: storage.decimals_1,
        }
    }

    fn decimals(&self, in_is_0: bool) -> (i128, i128) {
        if in_is_0 {
            (self.decimals_0, self.decimals_1)
        } else {
            (self.decimals_1, self.decimals_0)
        }
    }

    /// Invariant value for reserves ordered as (token0, token1).
    pub fn k(&self, env: &Env, reserve_0: i128, reserve_1: i128) -> Result<U256, PairError> {
        if reserve_0 < 0 || reserve_1 < 0 {
            return Err(PairError::InvalidAmount);
        }
        match self.kind {
            CurveKind::Volatile => Ok(wide(env, reserve_0).mul(&wide(env, reserve_1))),
            CurveKind::Stable => {
                let x = normalize(env, reserve_0, self.decimals_0);
                let y = normalize(env, reserve_1, self.decimals_1);
                Ok(stable_k(env, &x, &y))
            }
        }
    }

    /// Output for `amount_in` already net of fees.
    pub fn amount_out(
        &self,
        env: &Env,
        amount_in: i128,
        reserve_in: i128,
        reserve_out: i128,
        in_is_0: bool,
    ) -> Result<i128, PairError> {
        if amount_in < 0 {
            return Err(PairError::InvalidAmount);
        }
        if amount_in == 0 {
            return Ok(0);
        }
        if reserve_in <= 0 || reserve_out <= 0 {
            return Err(PairError::InsufficientLiquidity);
        }
        match self.kind {
            CurveKind::Volatile => {
                let denominator = reserve_in
                    .checked_add(amount_in)
                    .ok_or(PairError::Overflow)?;
                mul_div(env, amount_in, reserve_out, denominator)
            }
            CurveKind::Stable => {
                let (dec_in, dec_out) = self.decimals(in_is_0);
                let r_in = normalize(env, reserve_in, dec_in);
                let r_out = normalize(env, reserve_out, dec_out);
                let xy = stable_k(env, &r_in, &r_out);
                let x = r_in.add(&normalize(env, amount_in, dec_in));
                let y = get_y(env, &x, &xy, &r_out)?;
                if y >= r_out {
                    return Ok(0);
                }
                narrow(&r_out.sub(&y).mul(&wide(env, dec_out)).div(&precision(env)))
            }
        }
    }

    /// Smallest fee-free input that buys `amount_out`.
    pub fn amount_in(
        &self,
        env: &Env,
        amount_out: i128,
        reserve_in: i128,
        reserve_out: i128,
        in_is_0: bool,
    ) -> Result<i128, PairError> {
        if amount_out < 0 {
            return Err(PairError::InvalidAmount);
        }
        if amount_out == 0 {
            return Ok(0);
        }
        if reserve_in <= 0 || reserve_out <= 0 || amount_out >= reserve_out {
            return Err(PairError::InsufficientLiquidity);
        }
        match self.kind {
            CurveKind::Volatile => {
                Ok(mul_div(env, reserve_in, amount_out, reserve_out - amount_out)? + 1)
            }
            CurveKind::Stable => {
                let (dec_in, dec_out) = self.decimals(in_is_0);
                let r_in = normalize(env, reserve_in, dec_in);
                let r_out = normalize(env, reserve_out, dec_out);
                let xy = stable_k(env, &r_in, &r_out);
                let y = r_out.sub(&normalize(env, amount_out, dec_out));
                // the curve is symmetric, so the same solver yields x for a given y
                let x = get_y(env, &y, &xy, &r_in)?;
                if x <= r_in {
                    return Ok(1);
                }
                let scaled = x.sub(&r_in).mul(&wide(env, dec_in)).div(&precision(env));
                Ok(narrow(&scaled)? + 1)
            }
        }
    }

    /// Marginal price of token0 in token1, decimal-normalised, scaled by 1e18.
    pub fn marginal_price(
        &self,
        env: &Env,
        reserve_0: i128,
        reserve_1: i128,
    ) -> Result<i128, PairError> {
        if reserve_0 <= 0 || reserve_1 <= 0 {
            return Ok(0);
        }
        let p = precision(env);
        let x = normalize(env, reserve_0, self.decimals_0);
        let y = normalize(env, reserve_1, self.decimals_1);
        match self.kind {
            CurveKind::Volatile => narrow(&y.mul(&p).div(&x)),
            CurveKind::Stable => {
                let three = U256::from_u32(env, 3);
                let x2 = x.mul(&x).div(&p);
                let y2 = y.mul(&y).div(&p);
                let numerator = three.mul(&x2).mul(&y).div(&p).add(&y2.mul(&y).div(&p));
                let denominator = x2.mul(&x).div(&p).add(&three.mul(&x).mul(&y2).div(&p));
                narrow(&numerator.mul(&p).div(&denominator))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UNIT: i128 = 10_000_000;
    const RATIOS: [(i128, i128); 5] = [(1, 1_000), (1, 10), (1, 1), (10, 1), (1_000, 1)];

    fn curve(kind: CurveKind) -> Curve {
        Curve {
            kind,
            decimals_0: UNIT,
            decimals_1: UNIT,
        }
    }

    fn test_env() -> Env {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();
        env
    }

    #[test]
    fn get_y_fails_on_flat_slope() {
        let env = test_env();
        let zero = U256::from_u32(&env, 0);
        let xy = U256::from_u128(&env, 5);
        let y = U256::from_u128(&env, PRECISION as u128);
        assert_eq!(get_y(&env, &zero, &xy, &y), Err(PairError::NotConverged));
    }

    #[test]
    fn get_y_fails_when_estimates_cycle() {
        // settles into a two-step cycle four units wide
        let env = test_env();
        let x0 = U256::from_u128(&env, 545_157_881_554_021_248);
        let xy = U256::from_u128(&env, 33_863_873_923_410_488);
        let y = U256::from_u128(&env, 125);
        assert_eq!(get_y(&env, &x0, &xy, &y), Err(PairError::NotConverged));
    }

    #[test]
    fn volatile_amount_out_matches_closed_form() {
        let env = test_env();
        let out = curve(CurveKind::Volatile)
            .amount_out(&env, 10, 1_000, 1_000, true)
            .unwrap();
        assert_eq!(out, 9);
    }

    #[test]
    fn volatile_amount_in_rounds_up() {
        let env = test_env();
        let amount_in = curve(CurveKind::Volatile)
            .amount_in(&env, 9, 1_000, 1_000, true)
            .unwrap();
        // 1000 * 9 / 991 = 9.08
        assert_eq!(amount_in, 10);
    }

    #[test]
    fn stable_curve_is_flatter_near_peg() {
        let env = test_env();
        let reserve = 1_000_000 * UNIT;
        let amount_in = 10_000 * UNIT;
        let stable = curve(CurveKind::Stable)
            .amount_out(&env, amount_in, reserve, reserve, true)
            .unwrap();
        let volatile = curve(CurveKind::Volatile)
            .amount_out(&env, amount_in, reserve, reserve, true)
            .unwrap();
        assert!(stable > volatile);
        assert!(stable < amount_in);
        assert!(amount_in - stable < UNIT);
    }

    #[test]
    fn stable_quote_respects_decimals() {
        let env = test_env();
        let curve = Curve {
            kind: CurveKind::Stable,
            decimals_0: 1_000_000,
            decimals_1: 1_000_000_000_000_000_000,
        };
        let reserve_0 = 1_000_000 * 1_000_000;
        let reserve_1 = 1_000_000 * PRECISION;
        let out = curve
            .amount_out(&env, 1_000_000, reserve_0, reserve_1, true)
            .unwrap();
        // one 6-decimal unit buys just under one 18-decimal unit
        assert!(out < PRECISION);
        assert!(out > PRECISION - PRECISION / 1_000);
    }

    #[test]
    fn empty_reserves_are_rejected() {
        let env = test_env();
        let result = curve(CurveKind::Stable).amount_out(&env, 10, 0, 1_000, true);
        assert_eq!(result, Err(PairError::InsufficientLiquidity));
        let result = curve(CurveKind::Volatile).amount_in(&env, 1_000, 1_000, 1_000, true);
        assert_eq!(result, Err(PairError::InsufficientLiquidity));
    }

    #[test]
    fn marginal_price_at_peg_is_one() {
        let env = test_env();
        let reserve = 500 * UNIT;
        for kind in [CurveKind::Volatile, CurveKind::Stable] {
            let price = curve(kind).marginal_price(&env, reserve, reserve).unwrap();
            assert_eq!(price, PRECISION);
        }
        let price = curve(CurveKind::Volatile)
            .marginal_price(&env, reserve, 2 * reserve)
            .unwrap();
        assert_eq!(price, 2 * PRECISION);
    }

    #[test]
    fn sqrt_product_handles_wide_values() {
        let env = test_env();
        assert_eq!(sqrt_product(&env, 0, 5).unwrap(), 0);
        assert_eq!(sqrt_product(&env, 4, 9).unwrap(), 6);
        assert_eq!(sqrt_product(&env, 10, 10).unwrap(), 10);
        let big = 100_000_000_000_000_000_000;
        assert_eq!(sqrt_product(&env, big, big).unwrap(), big);
    }

    #[test]
    fn fee_rounds_down() {
        assert_eq!(fee_amount(1_003_010, 30).unwrap(), 3_009);
        assert_eq!(fee_amount(333, 30).unwrap(), 0);
        assert_eq!(fee_amount(1_000, 0).unwrap(), 0);
    }

    #[test]
    fn pow10_rejects_oversized_decimals() {
        assert_eq!(pow10(7).unwrap(), UNIT);
        assert_eq!(pow10(19), Err(PairError::InvalidToken));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn swaps_never_decrease_k(
            reserve_in in 1_000_000_000i128..10_000_000_000_000,
            ratio in 0usize..RATIOS.len(),
            share in 1i128..5_000,
            stable in any::<bool>(),
        ) {
            let env = test_env();
            let (num, den) = RATIOS[ratio];
            let reserve_out = reserve_in * num / den;
            let amount_in = reserve_in * share / 10_000;
            let curve = curve(if stable { CurveKind::Stable } else { CurveKind::Volatile });

            let out = curve.amount_out(&env, amount_in, reserve_in, reserve_out, true).unwrap();
            prop_assert!(out < reserve_out);
            let before = curve.k(&env, reserve_in, reserve_out).unwrap();
            let after = curve.k(&env, reserve_in + amount_in, reserve_out - out).unwrap();
            prop_assert!(after >= before);
        }

        #[test]
        fn inversion_is_tight(
            reserve_in in 1_000_000_000i128..10_000_000_000_000,
            ratio in 0usize..RATIOS.len(),
            share in 1i128..5_000,
            stable in any::<bool>(),
        ) {
            let env = test_env();
            let (num, den) = RATIOS[ratio];
            let reserve_out = reserve_in * num / den;
            let amount_out = (reserve_out * share / 10_000).max(1);
            let curve = curve(if stable { CurveKind::Stable } else { CurveKind::Volatile });

            let amount_in = curve.amount_in(&env, amount_out, reserve_in, reserve_out, true).unwrap();
            let forward = curve.amount_out(&env, amount_in, reserve_in, reserve_out, true).unwrap();
            prop_assert!(forward >= amount_out);
            let short = curve.amount_out(&env, amount_in - 1, reserve_in, reserve_out, true).unwrap();
            prop_assert!(short <= amount_out);
        }
    }
}
