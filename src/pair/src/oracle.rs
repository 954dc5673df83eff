//! Cumulative reserve/volume history kept by the pair.
//!
//! Observations live in a fixed ring of [`OBSERVATION_CAPACITY`] persistent
//! slots addressed by insertion index. The newest entry stays open for
//! [`PERIOD_SIZE`] seconds and is rewritten in place on every update; after
//! that a fresh entry is appended.

use soroban_sdk::{contracttype, Env};

use crate::errors::PairError;
use crate::storage::{self, DataKey};

pub const PERIOD_SIZE: u64 = 3_600;
pub const OBSERVATION_CAPACITY: u32 = 168;

/// Cumulative fields only ever grow, modulo 2^128. They wrap rather than
/// trap, and averages take wrapping differences, so a window that spans a
/// wrap still yields the right mean.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    pub timestamp: u64,
    pub reserve_0_cumulative: u128,
    pub reserve_1_cumulative: u128,
    pub volume_0_cumulative: u128,
    pub volume_1_cumulative: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObservationCursor {
    /// Entries appended since creation; the head lives at `count - 1`.
    pub count: u32,
    pub opened_at: u64,
}

pub fn should_append(opened_at: u64, now: u64) -> bool {
    now.saturating_sub(opened_at) >= PERIOD_SIZE
}

impl Observation {
    pub fn genesis(timestamp: u64) -> Self {
        Observation {
            timestamp,
            reserve_0_cumulative: 0,
            reserve_1_cumulative: 0,
            volume_0_cumulative: 0,
            volume_1_cumulative: 0,
        }
    }

    /// Carries the accumulators forward to `now`, weighting the reserves that
    /// were in effect since `self.timestamp`.
    pub fn advance(&self, reserve_0: i128, reserve_1: i128, volume_0: i128, volume_1: i128, now: u64) -> Self {
        let elapsed = now.saturating_sub(self.timestamp) as u128;
        Observation {
            timestamp: now.max(self.timestamp),
            reserve_0_cumulative: self
                .reserve_0_cumulative
                .wrapping_add((reserve_0.max(0) as u128).wrapping_mul(elapsed)),
            reserve_1_cumulative: self
                .reserve_1_cumulative
                .wrapping_add((reserve_1.max(0) as u128).wrapping_mul(elapsed)),
            volume_0_cumulative: self.volume_0_cumulative.wrapping_add(volume_0.max(0) as u128),
            volume_1_cumulative: self.volume_1_cumulative.wrapping_add(volume_1.max(0) as u128),
        }
    }
}

/// Time-weighted average reserves between two observations.
pub fn average_reserves(first: &Observation, last: &Observation) -> Result<(i128, i128), PairError> {
    if last.timestamp <= first.timestamp {
        return Err(PairError::InsufficientObservations);
    }
    let elapsed = (last.timestamp - first.timestamp) as u128;
    let r0 = last.reserve_0_cumulative.wrapping_sub(first.reserve_0_cumulative) / elapsed;
    let r1 = last.reserve_1_cumulative.wrapping_sub(first.reserve_1_cumulative) / elapsed;
    Ok((
        i128::try_from(r0).map_err(|_| PairError::Overflow)?,
        i128::try_from(r1).map_err(|_| PairError::Overflow)?,
    ))
}

/// Volume traded between two observations.
pub fn volume_between(first: &Observation, last: &Observation) -> Result<(i128, i128), PairError> {
    let v0 = last.volume_0_cumulative.wrapping_sub(first.volume_0_cumulative);
    let v1 = last.volume_1_cumulative.wrapping_sub(first.volume_1_cumulative);
    Ok((
        i128::try_from(v0).map_err(|_| PairError::Overflow)?,
        i128::try_from(v1).map_err(|_| PairError::Overflow)?,
    ))
}

fn slot(index: u32) -> DataKey {
    DataKey::Observation(index % OBSERVATION_CAPACITY)
}

fn read_cursor(env: &Env) -> Result<ObservationCursor, PairError> {
    env.storage()
        .instance()
        .get(&DataKey::ObservationCursor)
        .ok_or(PairError::NotInitialized)
}

fn write_slot(env: &Env, index: u32, observation: &Observation) {
    let key = slot(index);
    env.storage().persistent().set(&key, observation);
    storage::bump_persistent(env, &key);
}

pub fn initialize(env: &Env, now: u64) {
    write_slot(env, 0, &Observation::genesis(now));
    env.storage().instance().set(
        &DataKey::ObservationCursor,
        &ObservationCursor { count: 1, opened_at: now },
    );
}

pub fn length(env: &Env) -> Result<u32, PairError> {
    Ok(read_cursor(env)?.count)
}

pub fn latest(env: &Env) -> Result<Observation, PairError> {
    let cursor = read_cursor(env)?;
    get(env, cursor.count - 1)
}

pub fn get(env: &Env, index: u32) -> Result<Observation, PairError> {
    let cursor = read_cursor(env)?;
    let oldest = cursor.count.saturating_sub(OBSERVATION_CAPACITY);
    if index < oldest || index >= cursor.count {
        return Err(PairError::ObservationUnavailable);
    }
    env.storage()
        .persistent()
        .get(&slot(index))
        .ok_or(PairError::ObservationUnavailable)
}

/// Folds one reserve update into the history.
pub fn record(
    env: &Env,
    reserve_0: i128,
    reserve_1: i128,
    volume_0: i128,
    volume_1: i128,
    now: u64,
) -> Result<(), PairError> {
    let mut cursor = read_cursor(env)?;
    let head = get(env, cursor.count - 1)?;
    let next = head.advance(reserve_0, reserve_1, volume_0, volume_1, now);
    if should_append(cursor.opened_at, now) {
        write_slot(env, cursor.count, &next);
        cursor.count += 1;
        cursor.opened_at = now;
        env.storage()
            .instance()
            .set(&DataKey::ObservationCursor, &cursor);
    } else {
        write_slot(env, cursor.count - 1, &next);
    }
    Ok(())
}
