//! LP share ledger. The pair is its own share token.

use soroban_sdk::{Address, Env};

use crate::errors::PairError;
use crate::events;
use crate::storage::{self, AllowanceKey, DataKey, PairStorage};

pub const SHARE_DECIMALS: u32 = 7;
/// Locked forever on the first deposit so the supply never returns to zero.
pub const MINIMUM_LIQUIDITY: i128 = 1_000;

pub fn balance_of(env: &Env, id: &Address) -> i128 {
    let key = DataKey::Balance(id.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

fn write_balance(env: &Env, id: &Address, amount: i128) {
    let key = DataKey::Balance(id.clone());
    env.storage().persistent().set(&key, &amount);
    storage::bump_persistent(env, &key);
}

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    env.storage().persistent().set(&key, &amount);
    storage::bump_persistent(env, &key);
    events::Approval {
        owner: owner.clone(),
        spender: spender.clone(),
        amount,
    }
    .publish(env);
}

pub fn spend_allowance(
    env: &Env,
    owner: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), PairError> {
    let current = allowance(env, owner, spender);
    if current < amount {
        return Err(PairError::InsufficientAllowance);
    }
    write_allowance(env, owner, spender, current - amount);
    Ok(())
}

pub fn nonce(env: &Env, owner: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::Nonce(owner.clone()))
        .unwrap_or(0)
}

pub fn bump_nonce(env: &Env, owner: &Address) {
    let key = DataKey::Nonce(owner.clone());
    env.storage().persistent().set(&key, &(nonce(env, owner) + 1));
    storage::bump_persistent(env, &key);
}

pub fn move_shares(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), PairError> {
    if amount < 0 {
        return Err(PairError::InvalidAmount);
    }
    let from_balance = balance_of(env, from);
    if from_balance < amount {
        return Err(PairError::InsufficientBalance);
    }
    write_balance(env, from, from_balance - amount);
    write_balance(env, to, balance_of(env, to) + amount);
    events::Transfer {
        from: from.clone(),
        to: to.clone(),
        amount,
    }
    .publish(env);
    Ok(())
}

pub fn mint_shares(env: &Env, pair: &mut PairStorage, to: &Address, amount: i128) -> Result<(), PairError> {
    pair.total_supply = pair
        .total_supply
        .checked_add(amount)
        .ok_or(PairError::Overflow)?;
    write_balance(env, to, balance_of(env, to) + amount);
    Ok(())
}

pub fn burn_shares(env: &Env, pair: &mut PairStorage, from: &Address, amount: i128) -> Result<(), PairError> {
    let balance = balance_of(env, from);
    if balance < amount {
        return Err(PairError::InsufficientBalance);
    }
    write_balance(env, from, balance - amount);
    pair.total_supply -= amount;
    Ok(())
}
