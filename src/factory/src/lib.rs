#![no_std]

mod errors;
mod events;
mod interfaces;
mod storage;

#[cfg(test)]
extern crate std;


use soroban_sdk::{contract, contractimpl, xdr::ToXdr, Address, Bytes, BytesN, Env, String};

pub use crate::errors::FactoryError;

use crate::interfaces::PairClient;
use crate::storage::{FactoryStorage, PairKey};

const PAIR_SALT_TAG: u8 = 0;
const CONCENTRATED_SALT_TAG: u8 = 1;

fn is_zero_address(env: &Env, address: &Address) -> bool {
    let zero = Address::from_string(&String::from_str(
        env,
        "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF",
    ));
    address == &zero
}

fn pair_key(
    env: &Env,
    token_a: Address,
    token_b: Address,
    stable: bool,
) -> Result<PairKey, FactoryError> {
    if token_a == token_b {
        return Err(FactoryError::IdenticalAddresses);
    }
    let (token_0, token_1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    if is_zero_address(env, &token_0) || is_zero_address(env, &token_1) {
        return Err(FactoryError::ZeroAddress);
    }
    Ok(PairKey {
        token_0,
        token_1,
        stable,
    })
}

/// sha256 over both token addresses, the curve kind and which of the two
/// contracts is being deployed.
fn salt(env: &Env, key: &PairKey, tag: u8) -> BytesN<32> {
    let mut bytes = Bytes::new(env);
    bytes.append(&key.token_0.clone().to_xdr(env));
    bytes.append(&key.token_1.clone().to_xdr(env));
    bytes.push_back(key.stable as u8);
    bytes.push_back(tag);
    env.crypto().sha256(&bytes).to_bytes()
}

fn only_pauser(env: &Env, caller: &Address) -> Result<FactoryStorage, FactoryError> {
    let storage = storage::read(env)?;
    if *caller != storage.pauser {
        return Err(FactoryError::NotPauser);
    }
    caller.require_auth();
    Ok(storage)
}

#[contract]
pub struct PairFactory;

#[contractimpl]
impl PairFactory {
    pub fn initialize(
        env: Env,
        pauser: Address,
        pair_wasm_hash: BytesN<32>,
        concentrated_wasm_hash: BytesN<32>,
    ) -> Result<(), FactoryError> {
        if storage::is_initialized(&env) {
            return Err(FactoryError::AlreadyInitialized);
        }
        if is_zero_address(&env, &pauser) {
            return Err(FactoryError::ZeroAddress);
        }
        pauser.require_auth();
        storage::write(
            &env,
            &FactoryStorage {
                pauser,
                pending_pauser: None,
                paused: false,
                pair_wasm_hash,
                concentrated_wasm_hash,
            },
        );
        Ok(())
    }

    /// Deploys a pair and its satellite for `(token_a, token_b, stable)`.
    /// Anyone may call this.
    pub fn create_pair(
        env: Env,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, FactoryError> {
        let storage = storage::read(&env)?;
        let key = pair_key(&env, token_a, token_b, stable)?;
        if storage::pair(&env, &key).is_some() {
            return Err(FactoryError::PairExists);
        }

        let concentrated_pair = env
            .deployer()
            .with_current_contract(salt(&env, &key, CONCENTRATED_SALT_TAG))
            .deploy_v2(storage.concentrated_wasm_hash.clone(), ());
        let pair = env
            .deployer()
            .with_current_contract(salt(&env, &key, PAIR_SALT_TAG))
            .deploy_v2(storage.pair_wasm_hash.clone(), ());

        PairClient::new(&env, &pair).initialize(
            &env.current_contract_address(),
            &key.token_0,
            &key.token_1,
            &stable,
            &concentrated_pair,
        );

        let index = storage::push_pair(&env, &key, &pair);
        events::PairCreated {
            token_0: key.token_0,
            token_1: key.token_1,
            stable,
            pair: pair.clone(),
            concentrated_pair,
            index,
        }
        .publish(&env);
        storage::bump_instance(&env);
        Ok(pair)
    }

    pub fn get_pair(
        env: Env,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, FactoryError> {
        let key = pair_key(&env, token_a, token_b, stable)?;
        storage::pair(&env, &key).ok_or(FactoryError::PairNotFound)
    }

    /// Address the pair for these tokens has, or will have once created.
    pub fn pair_address(
        env: Env,
        token_a: Address,
        token_b: Address,
        stable: bool,
    ) -> Result<Address, FactoryError> {
        let key = pair_key(&env, token_a, token_b, stable)?;
        Ok(env
            .deployer()
            .with_current_contract(salt(&env, &key, PAIR_SALT_TAG))
            .deployed_address())
    }

    pub fn all_pairs_length(env: Env) -> u32 {
        storage::all_pairs_length(&env)
    }

    pub fn all_pairs(env: Env, index: u32) -> Result<Address, FactoryError> {
        storage::all_pairs(&env, index).ok_or(FactoryError::PairNotFound)
    }

    // ---------------------------------------------------------------------
    // Pauser

    pub fn pauser(env: Env) -> Result<Address, FactoryError> {
        Ok(storage::read(&env)?.pauser)
    }

    /// First half of the handover; `new_pauser` must call `accept_pauser`.
    pub fn set_pauser(env: Env, caller: Address, new_pauser: Address) -> Result<(), FactoryError> {
        let mut storage = only_pauser(&env, &caller)?;
        if is_zero_address(&env, &new_pauser) {
            return Err(FactoryError::ZeroAddress);
        }
        storage.pending_pauser = Some(new_pauser.clone());
        storage::write(&env, &storage);
        events::PauserProposed { pauser: new_pauser }.publish(&env);
        Ok(())
    }

    pub fn accept_pauser(env: Env, caller: Address) -> Result<(), FactoryError> {
        let mut storage = storage::read(&env)?;
        if storage.pending_pauser.as_ref() != Some(&caller) {
            return Err(FactoryError::NotPendingPauser);
        }
        caller.require_auth();
        storage.pauser = caller.clone();
        storage.pending_pauser = None;
        storage::write(&env, &storage);
        events::PauserAccepted { pauser: caller }.publish(&env);
        Ok(())
    }

    pub fn set_pause(env: Env, caller: Address, paused: bool) -> Result<(), FactoryError> {
        let mut storage = only_pauser(&env, &caller)?;
        storage.paused = paused;
        storage::write(&env, &storage);
        events::PauseSet { paused }.publish(&env);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        storage::read(&env).map(|s| s.paused).unwrap_or(false)
    }

    // ---------------------------------------------------------------------
    // Pair parameters

    pub fn set_swap_fee(
        env: Env,
        caller: Address,
        pair: Address,
        swap_fee_bps: u32,
    ) -> Result<(), FactoryError> {
        only_pauser(&env, &caller)?;
        PairClient::new(&env, &pair).set_swap_fee(&env.current_contract_address(), &swap_fee_bps);
        Ok(())
    }

    pub fn set_concentrated_enabled(
        env: Env,
        caller: Address,
        pair: Address,
        enabled: bool,
    ) -> Result<(), FactoryError> {
        only_pauser(&env, &caller)?;
        PairClient::new(&env, &pair)
            .set_concentrated_enabled(&env.current_contract_address(), &enabled);
        Ok(())
    }
}
