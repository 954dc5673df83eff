use soroban_sdk::{contracttype, Address, Env};

use crate::errors::PairError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

pub const DEFAULT_SWAP_FEE_BPS: u32 = 30;
pub const MAX_SWAP_FEE_BPS: u32 = 100;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    PairStorage,
    FeeState,
    ReentrancyGuard,
    ObservationCursor,
    Observation(u32),
    Balance(Address),
    Allowance(AllowanceKey),
    Nonce(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceKey {
    pub owner: Address,
    pub spender: Address,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CurveKind {
    Volatile,
    Stable,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PairStorage {
    pub factory: Address,
    pub token_0: Address,
    pub token_1: Address,
    pub concentrated_pair: Address,
    pub concentrated_enabled: bool,
    pub curve: CurveKind,
    pub decimals_0: i128,
    pub decimals_1: i128,
    pub reserve_0: i128,
    pub reserve_1: i128,
    pub block_timestamp_last: u64,
    pub price_0_cumulative_last: u128,
    pub price_1_cumulative_last: u128,
    pub total_supply: i128,
}

/// Swap fee rate plus the running total of fees the pair has kept.
#[contracttype]
#[derive(Clone, Debug)]
pub struct FeeState {
    pub swap_fee_bps: u32,
    pub fees_0: i128,
    pub fees_1: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ReentrancyGuard {
    pub locked: bool,
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::PairStorage)
}

pub fn read_pair(env: &Env) -> Result<PairStorage, PairError> {
    env.storage()
        .instance()
        .get(&DataKey::PairStorage)
        .ok_or(PairError::NotInitialized)
}

pub fn write_pair(env: &Env, storage: &PairStorage) {
    env.storage().instance().set(&DataKey::PairStorage, storage);
}

pub fn read_fee_state(env: &Env) -> Result<FeeState, PairError> {
    env.storage()
        .instance()
        .get(&DataKey::FeeState)
        .ok_or(PairError::NotInitialized)
}

pub fn write_fee_state(env: &Env, fee_state: &FeeState) {
    env.storage().instance().set(&DataKey::FeeState, fee_state);
}

pub fn acquire_lock(env: &Env) -> Result<(), PairError> {
    let guard: ReentrancyGuard = env
        .storage()
        .instance()
        .get(&DataKey::ReentrancyGuard)
        .ok_or(PairError::NotInitialized)?;
    if guard.locked {
        return Err(PairError::Reentrant);
    }
    env.storage()
        .instance()
        .set(&DataKey::ReentrancyGuard, &ReentrancyGuard { locked: true });
    Ok(())
}

pub fn release_lock(env: &Env) {
    env.storage()
        .instance()
        .set(&DataKey::ReentrancyGuard, &ReentrancyGuard { locked: false });
}

/// Runs `body` with the reentrancy guard held and releases it on every exit
/// path, including errors.
pub fn non_reentrant<T>(
    env: &Env,
    body: impl FnOnce() -> Result<T, PairError>,
) -> Result<T, PairError> {
    acquire_lock(env)?;
    let result = body();
    release_lock(env);
    bump_instance(env);
    result
}
