use soroban_sdk::{contracttype, Address, Env};

use crate::errors::ConcentratedError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    ConcentratedStorage,
}

/// Satellite state. While `enabled` is false, `price` and both reserves are zero.
#[contracttype]
#[derive(Clone, Debug)]
pub struct ConcentratedStorage {
    pub pair: Address,
    pub token_0: Address,
    pub token_1: Address,
    /// `10^decimals` of each token.
    pub decimals_0: i128,
    pub decimals_1: i128,
    /// token1 per token0, decimal-normalised, scaled by 1e18.
    pub price: i128,
    pub reserve_0: i128,
    pub reserve_1: i128,
    pub enabled: bool,
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::ConcentratedStorage)
}

pub fn read(env: &Env) -> Result<ConcentratedStorage, ConcentratedError> {
    env.storage()
        .instance()
        .get(&DataKey::ConcentratedStorage)
        .ok_or(ConcentratedError::NotInitialized)
}

pub fn write(env: &Env, storage: &ConcentratedStorage) {
    env.storage()
        .instance()
        .set(&DataKey::ConcentratedStorage, storage);
    bump_instance(env);
}
