#![no_std]

mod errors;
mod events;
mod pricing;
mod storage;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod test;

use soroban_sdk::{contract, contractimpl, log, token, Address, Env};

pub use crate::errors::ConcentratedError;
pub use crate::pricing::PRECISION;

use crate::pricing::Pricing;
use crate::storage::ConcentratedStorage;

/// Loads state and checks that `caller` is the parent pair.
fn only_pair(env: &Env, caller: &Address) -> Result<ConcentratedStorage, ConcentratedError> {
    let storage = storage::read(env)?;
    if *caller != storage.pair {
        return Err(ConcentratedError::NotPair);
    }
    caller.require_auth();
    Ok(storage)
}

fn balances(env: &Env, storage: &ConcentratedStorage) -> (i128, i128) {
    let this = env.current_contract_address();
    (
        token::Client::new(env, &storage.token_0).balance(&this),
        token::Client::new(env, &storage.token_1).balance(&this),
    )
}

/// Secondary inventory owned by a single pair, trading at one price that the
/// pair keeps in line with its curve.
#[contract]
pub struct ConcentratedPair;

#[contractimpl]
impl ConcentratedPair {
    pub fn initialize(
        env: Env,
        pair: Address,
        token_0: Address,
        token_1: Address,
    ) -> Result<(), ConcentratedError> {
        if storage::is_initialized(&env) {
            return Err(ConcentratedError::AlreadyInitialized);
        }
        if token_0 == token_1 {
            return Err(ConcentratedError::InvalidToken);
        }
        pair.require_auth();

        let decimals_0 = pricing::pow10(token::Client::new(&env, &token_0).decimals())?;
        let decimals_1 = pricing::pow10(token::Client::new(&env, &token_1).decimals())?;
        storage::write(
            &env,
            &ConcentratedStorage {
                pair,
                token_0,
                token_1,
                decimals_0,
                decimals_1,
                price: 0,
                reserve_0: 0,
                reserve_1: 0,
                enabled: false,
            },
        );
        Ok(())
    }

    pub fn set_price(env: Env, caller: Address, price: i128) -> Result<(), ConcentratedError> {
        let mut storage = only_pair(&env, &caller)?;
        if !storage.enabled {
            return Err(ConcentratedError::Disabled);
        }
        if price <= 0 {
            return Err(ConcentratedError::InvalidPrice);
        }
        storage.price = price;
        storage::write(&env, &storage);
        events::PriceUpdated { price }.publish(&env);
        Ok(())
    }

    /// Enabling adopts the current balances as reserves. Disabling sends both
    /// balances back to the pair and clears price and reserves.
    pub fn set_enabled(
        env: Env,
        caller: Address,
        enabled: bool,
        price: i128,
    ) -> Result<(), ConcentratedError> {
        let mut storage = only_pair(&env, &caller)?;
        let (balance_0, balance_1) = balances(&env, &storage);

        if enabled {
            if price <= 0 {
                return Err(ConcentratedError::InvalidPrice);
            }
            storage.enabled = true;
            storage.price = price;
            storage.reserve_0 = balance_0;
            storage.reserve_1 = balance_1;
            storage::write(&env, &storage);
            events::Enabled {
                price,
                reserve_0: balance_0,
                reserve_1: balance_1,
            }
            .publish(&env);
            return Ok(());
        }

        let this = env.current_contract_address();
        if balance_0 > 0 {
            token::Client::new(&env, &storage.token_0).transfer(&this, &storage.pair, &balance_0);
        }
        if balance_1 > 0 {
            token::Client::new(&env, &storage.token_1).transfer(&this, &storage.pair, &balance_1);
        }
        log!(&env, "satellite returned inventory", balance_0, balance_1);
        storage.enabled = false;
        storage.price = 0;
        storage.reserve_0 = 0;
        storage.reserve_1 = 0;
        storage::write(&env, &storage);
        events::Disabled {
            amount_0: balance_0,
            amount_1: balance_1,
        }
        .publish(&env);
        Ok(())
    }

    pub fn withdraw(
        env: Env,
        caller: Address,
        to: Address,
        amount_0: i128,
        amount_1: i128,
    ) -> Result<(), ConcentratedError> {
        let mut storage = only_pair(&env, &caller)?;
        if amount_0 < 0 || amount_1 < 0 {
            return Err(ConcentratedError::InvalidAmount);
        }
        if amount_0 > storage.reserve_0 || amount_1 > storage.reserve_1 {
            return Err(ConcentratedError::InsufficientLiquidity);
        }
        let this = env.current_contract_address();
        if amount_0 > 0 {
            token::Client::new(&env, &storage.token_0).transfer(&this, &to, &amount_0);
        }
        if amount_1 > 0 {
            token::Client::new(&env, &storage.token_1).transfer(&this, &to, &amount_1);
        }
        storage.reserve_0 -= amount_0;
        storage.reserve_1 -= amount_1;
        storage::write(&env, &storage);
        Ok(())
    }

    pub fn sync(env: Env, caller: Address) -> Result<(), ConcentratedError> {
        let mut storage = only_pair(&env, &caller)?;
        if !storage.enabled {
            return Err(ConcentratedError::Disabled);
        }
        let (balance_0, balance_1) = balances(&env, &storage);
        storage.reserve_0 = balance_0;
        storage.reserve_1 = balance_1;
        storage::write(&env, &storage);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Quotes

    /// Returns `(amount_out, amount_in_remaining)`.
    pub fn get_amount_out(
        env: Env,
        amount_in: i128,
        token_in: Address,
    ) -> Result<(i128, i128), ConcentratedError> {
        let storage = storage::read(&env)?;
        let in_is_0 = if token_in == storage.token_0 {
            true
        } else if token_in == storage.token_1 {
            false
        } else {
            return Err(ConcentratedError::InvalidToken);
        };
        let reserve_out = if in_is_0 {
            storage.reserve_1
        } else {
            storage.reserve_0
        };
        Pricing::of(&storage).fill_out(&env, amount_in, in_is_0, reserve_out)
    }

    /// Returns `(amount_0_in, amount_1_in, amount_0_out_remaining,
    /// amount_1_out_remaining)`.
    pub fn get_amount_in(
        env: Env,
        amount_0_out: i128,
        amount_1_out: i128,
    ) -> Result<(i128, i128, i128, i128), ConcentratedError> {
        let storage = storage::read(&env)?;
        let pricing = Pricing::of(&storage);
        let (amount_1_in, remaining_0) =
            pricing.fill_in(&env, amount_0_out, true, storage.reserve_0)?;
        let (amount_0_in, remaining_1) =
            pricing.fill_in(&env, amount_1_out, false, storage.reserve_1)?;
        Ok((amount_0_in, amount_1_in, remaining_0, remaining_1))
    }

    // ---------------------------------------------------------------------
    // Views

    pub fn pair(env: Env) -> Result<Address, ConcentratedError> {
        Ok(storage::read(&env)?.pair)
    }

    pub fn token_0(env: Env) -> Result<Address, ConcentratedError> {
        Ok(storage::read(&env)?.token_0)
    }

    pub fn token_1(env: Env) -> Result<Address, ConcentratedError> {
        Ok(storage::read(&env)?.token_1)
    }

    pub fn price(env: Env) -> Result<i128, ConcentratedError> {
        Ok(storage::read(&env)?.price)
    }

    pub fn enabled(env: Env) -> Result<bool, ConcentratedError> {
        Ok(storage::read(&env)?.enabled)
    }

    pub fn get_reserves(env: Env) -> Result<(i128, i128), ConcentratedError> {
        let storage = storage::read(&env)?;
        Ok((storage.reserve_0, storage.reserve_1))
    }
}
