use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::errors::FactoryError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    FactoryStorage,
    AllPairsLength,
    Pair(PairKey),
    AllPairs(u32),
}

/// Tokens in canonical order plus the curve kind.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PairKey {
    pub token_0: Address,
    pub token_1: Address,
    pub stable: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct FactoryStorage {
    pub pauser: Address,
    pub pending_pauser: Option<Address>,
    pub paused: bool,
    pub pair_wasm_hash: BytesN<32>,
    pub concentrated_wasm_hash: BytesN<32>,
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::FactoryStorage)
}

pub fn read(env: &Env) -> Result<FactoryStorage, FactoryError> {
    env.storage()
        .instance()
        .get(&DataKey::FactoryStorage)
        .ok_or(FactoryError::NotInitialized)
}

pub fn write(env: &Env, storage: &FactoryStorage) {
    env.storage().instance().set(&DataKey::FactoryStorage, storage);
    bump_instance(env);
}

pub fn pair(env: &Env, key: &PairKey) -> Option<Address> {
    env.storage().persistent().get(&DataKey::Pair(key.clone()))
}

pub fn all_pairs_length(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::AllPairsLength)
        .unwrap_or(0)
}

pub fn all_pairs(env: &Env, index: u32) -> Option<Address> {
    env.storage().persistent().get(&DataKey::AllPairs(index))
}

pub fn push_pair(env: &Env, key: &PairKey, pair: &Address) -> u32 {
    let index = all_pairs_length(env);
    let by_tokens = DataKey::Pair(key.clone());
    let by_index = DataKey::AllPairs(index);
    env.storage().persistent().set(&by_tokens, pair);
    env.storage().persistent().set(&by_index, pair);
    for key in [by_tokens, by_index] {
        env.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
    }
    env.storage()
        .instance()
        .set(&DataKey::AllPairsLength, &(index + 1));
    index
}
