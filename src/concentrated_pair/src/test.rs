#![cfg(test)]

use super::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{contracttype, Address, Env};

/// Token with configurable decimals; Stellar asset contracts are fixed at 7.
mod mock_token {
    use soroban_sdk::{contract, contractimpl, Address, Env};

    use super::TokenKey;

    #[contract]
    pub struct MockToken;

    #[contractimpl]
    impl MockToken {
        pub fn set_decimals(env: Env, decimals: u32) {
            env.storage().instance().set(&TokenKey::Decimals, &decimals);
        }

        pub fn decimals(env: Env) -> u32 {
            env.storage().instance().get(&TokenKey::Decimals).unwrap_or(7)
        }

        pub fn mint(env: Env, to: Address, amount: i128) {
            let balance = Self::balance(env.clone(), to.clone());
            env.storage()
                .instance()
                .set(&TokenKey::Balance(to), &(balance + amount));
        }

        pub fn balance(env: Env, id: Address) -> i128 {
            env.storage()
                .instance()
                .get(&TokenKey::Balance(id))
                .unwrap_or(0)
        }

        pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
            from.require_auth();
            let from_balance = Self::balance(env.clone(), from.clone());
            assert!(from_balance >= amount, "insufficient balance");
            env.storage()
                .instance()
                .set(&TokenKey::Balance(from), &(from_balance - amount));
            Self::mint(env, to, amount);
        }
    }
}

#[contracttype]
#[derive(Clone)]
pub enum TokenKey {
    Decimals,
    Balance(Address),
}

use mock_token::{MockToken, MockTokenClient};

const WBTC: i128 = 100_000_000;
const USDC: i128 = 1_000_000;

struct Setup<'a> {
    env: Env,
    pair: Address,
    wbtc: MockTokenClient<'a>,
    usdc: MockTokenClient<'a>,
    satellite: ConcentratedPairClient<'a>,
}

fn token<'a>(env: &Env, decimals: u32) -> MockTokenClient<'a> {
    let id = env.register(MockToken, ());
    let client = MockTokenClient::new(env, &id);
    client.set_decimals(&decimals);
    client
}

/// WBTC (8 dp) as token0 and USDC (6 dp) as token1, not yet enabled.
fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let pair = Address::generate(&env);
    let wbtc = token(&env, 8);
    let usdc = token(&env, 6);
    let satellite_id = env.register(ConcentratedPair, ());
    let satellite = ConcentratedPairClient::new(&env, &satellite_id);
    satellite.initialize(&pair, &wbtc.address, &usdc.address);

    Setup {
        env,
        pair,
        wbtc,
        usdc,
        satellite,
    }
}

/// One WBTC and two USDC in inventory at a price of two.
fn enabled<'a>() -> Setup<'a> {
    let s = setup();
    s.wbtc.mint(&s.satellite.address, &WBTC);
    s.usdc.mint(&s.satellite.address, &(2 * USDC));
    s.satellite.set_enabled(&s.pair, &true, &(2 * PRECISION));
    s
}

#[test]
fn test_initialize_starts_disabled() {
    let s = setup();
    assert_eq!(s.satellite.pair(), s.pair);
    assert_eq!(s.satellite.token_0(), s.wbtc.address);
    assert_eq!(s.satellite.token_1(), s.usdc.address);
    assert!(!s.satellite.enabled());
    assert_eq!(s.satellite.price(), 0);
    assert_eq!(s.satellite.get_reserves(), (0, 0));
}

#[test]
fn test_already_initialized() {
    let s = setup();
    let result = s
        .satellite
        .try_initialize(&s.pair, &s.wbtc.address, &s.usdc.address);
    assert_eq!(result, Err(Ok(ConcentratedError::AlreadyInitialized)));
}

#[test]
fn test_identical_tokens_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let wbtc = token(&env, 8);
    let satellite = ConcentratedPairClient::new(&env, &env.register(ConcentratedPair, ()));
    let result = satellite.try_initialize(&Address::generate(&env), &wbtc.address, &wbtc.address);
    assert_eq!(result, Err(Ok(ConcentratedError::InvalidToken)));
}

#[test]
fn test_too_many_decimals_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let a = token(&env, 19);
    let b = token(&env, 6);
    let satellite = ConcentratedPairClient::new(&env, &env.register(ConcentratedPair, ()));
    let result = satellite.try_initialize(&Address::generate(&env), &a.address, &b.address);
    assert_eq!(result, Err(Ok(ConcentratedError::InvalidToken)));
}

#[test]
fn test_mutations_are_parent_only() {
    let s = enabled();
    let stranger = Address::generate(&s.env);
    assert_eq!(
        s.satellite.try_set_price(&stranger, &PRECISION),
        Err(Ok(ConcentratedError::NotPair))
    );
    assert_eq!(
        s.satellite.try_set_enabled(&stranger, &false, &0),
        Err(Ok(ConcentratedError::NotPair))
    );
    assert_eq!(
        s.satellite.try_withdraw(&stranger, &stranger, &1, &0),
        Err(Ok(ConcentratedError::NotPair))
    );
    assert_eq!(
        s.satellite.try_sync(&stranger),
        Err(Ok(ConcentratedError::NotPair))
    );
}

#[test]
fn test_set_price_rules() {
    let s = setup();
    assert_eq!(
        s.satellite.try_set_price(&s.pair, &PRECISION),
        Err(Ok(ConcentratedError::Disabled))
    );

    let s = enabled();
    assert_eq!(
        s.satellite.try_set_price(&s.pair, &0),
        Err(Ok(ConcentratedError::InvalidPrice))
    );
    s.satellite.set_price(&s.pair, &(3 * PRECISION));
    assert_eq!(s.satellite.price(), 3 * PRECISION);
}

#[test]
fn test_enable_adopts_balances() {
    let s = enabled();
    assert!(s.satellite.enabled());
    assert_eq!(s.satellite.price(), 2 * PRECISION);
    assert_eq!(s.satellite.get_reserves(), (WBTC, 2 * USDC));
}

#[test]
fn test_enable_needs_positive_price() {
    let s = setup();
    assert_eq!(
        s.satellite.try_set_enabled(&s.pair, &true, &0),
        Err(Ok(ConcentratedError::InvalidPrice))
    );
}

#[test]
fn test_amount_out_across_decimals() {
    let s = enabled();
    // 0.1 USDC buys 0.05 WBTC
    assert_eq!(
        s.satellite.get_amount_out(&(USDC / 10), &s.usdc.address),
        (5 * WBTC / 100, 0)
    );
    // 5 USDC would buy 2.5 WBTC; only 1 is held, 3 USDC left over
    assert_eq!(
        s.satellite.get_amount_out(&(5 * USDC), &s.usdc.address),
        (WBTC, 3 * USDC)
    );
    // 2 WBTC would buy 4 USDC; only 2 are held, 1 WBTC left over
    assert_eq!(
        s.satellite.get_amount_out(&(2 * WBTC), &s.wbtc.address),
        (2 * USDC, WBTC)
    );
}

#[test]
fn test_amount_in_across_decimals() {
    let s = enabled();
    assert_eq!(
        s.satellite.get_amount_in(&(WBTC / 10), &0),
        (0, USDC / 5, 0, 0)
    );
    assert_eq!(
        s.satellite.get_amount_in(&0, &(4 * USDC)),
        (WBTC, 0, 0, 2 * USDC)
    );
    assert_eq!(
        s.satellite.get_amount_in(&(5 * WBTC), &0),
        (0, 2 * USDC, 4 * WBTC, 0)
    );
}

#[test]
fn test_quotes_reject_foreign_token() {
    let s = enabled();
    let other = Address::generate(&s.env);
    assert_eq!(
        s.satellite.try_get_amount_out(&1_000, &other),
        Err(Ok(ConcentratedError::InvalidToken))
    );
}

#[test]
fn test_disabled_quotes_pass_through() {
    let s = setup();
    assert_eq!(s.satellite.get_amount_out(&1_000, &s.wbtc.address), (0, 1_000));
    assert_eq!(s.satellite.get_amount_in(&7, &9), (0, 0, 7, 9));
}

#[test]
fn test_withdraw_bounded_by_reserves() {
    let s = enabled();
    let to = Address::generate(&s.env);
    assert_eq!(
        s.satellite.try_withdraw(&s.pair, &to, &(WBTC + 1), &0),
        Err(Ok(ConcentratedError::InsufficientLiquidity))
    );
    assert_eq!(
        s.satellite.try_withdraw(&s.pair, &to, &-1, &0),
        Err(Ok(ConcentratedError::InvalidAmount))
    );

    s.satellite.withdraw(&s.pair, &to, &(WBTC / 4), &USDC);
    assert_eq!(s.wbtc.balance(&to), WBTC / 4);
    assert_eq!(s.usdc.balance(&to), USDC);
    assert_eq!(s.satellite.get_reserves(), (3 * WBTC / 4, USDC));
}

#[test]
fn test_sync_picks_up_payments() {
    let s = enabled();
    s.usdc.mint(&s.satellite.address, &USDC);
    assert_eq!(s.satellite.get_reserves(), (WBTC, 2 * USDC));
    s.satellite.sync(&s.pair);
    assert_eq!(s.satellite.get_reserves(), (WBTC, 3 * USDC));
}

#[test]
fn test_sync_requires_enabled() {
    let s = setup();
    assert_eq!(
        s.satellite.try_sync(&s.pair),
        Err(Ok(ConcentratedError::Disabled))
    );
}

#[test]
fn test_disable_returns_everything() {
    let s = enabled();
    s.satellite.set_enabled(&s.pair, &false, &0);

    assert!(!s.satellite.enabled());
    assert_eq!(s.satellite.price(), 0);
    assert_eq!(s.satellite.get_reserves(), (0, 0));
    assert_eq!(s.wbtc.balance(&s.satellite.address), 0);
    assert_eq!(s.usdc.balance(&s.satellite.address), 0);
    assert_eq!(s.wbtc.balance(&s.pair), WBTC);
    assert_eq!(s.usdc.balance(&s.pair), 2 * USDC);
}

#[test]
fn test_reenable_takes_new_price() {
    let s = enabled();
    s.satellite.set_enabled(&s.pair, &false, &0);
    s.wbtc.mint(&s.satellite.address, &WBTC);
    s.satellite.set_enabled(&s.pair, &true, &(5 * PRECISION));
    assert_eq!(s.satellite.price(), 5 * PRECISION);
    assert_eq!(s.satellite.get_reserves(), (WBTC, 0));
}
