use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::accrual::EpochSource;
use crate::ContractError;

// ── Storage key constants ───────────────────────────────────────────────────

/// Number of epochs recorded so far; the highest ordinal is `count - 1`.
const EPOCH_COUNT: Symbol = symbol_short!("EPOCH_CNT");
/// Lock duration (seconds) applied to new and topped-up deposits.
const LOCK_DURATION: Symbol = symbol_short!("LOCK_DUR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Types ───────────────────────────────────────────────────────────────────

/// One interest-rate regime.
///
/// Epochs are append-only: once written they are never modified or removed,
/// and `effective_at` never decreases as `ordinal` grows.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RateEpoch {
    /// 0-based position in the history.
    pub ordinal: u32,
    /// Reward per full lock window in basis points (123 = 1.23 %).
    pub rate_bps: u32,
    /// Ledger timestamp from which this rate applies.
    pub effective_at: u64,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn epoch_key(ordinal: u32) -> (Symbol, u32) {
    (symbol_short!("EPOCH"), ordinal)
}

fn store_epoch(env: &Env, epoch: &RateEpoch) {
    let key = epoch_key(epoch.ordinal);
    env.storage().persistent().set(&key, epoch);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Retrieve an epoch by ordinal, returning `None` past the end of the history.
pub fn get_epoch(env: &Env, ordinal: u32) -> Option<RateEpoch> {
    let key = epoch_key(ordinal);
    let epoch: Option<RateEpoch> = env.storage().persistent().get(&key);
    if epoch.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    epoch
}

pub fn epoch_count(env: &Env) -> u32 {
    env.storage().instance().get(&EPOCH_COUNT).unwrap_or(0)
}

/// Highest ordinal written so far.
pub fn max_ordinal(env: &Env) -> Result<u32, ContractError> {
    epoch_count(env)
        .checked_sub(1)
        .ok_or(ContractError::NotInitialized)
}

pub fn current_epoch(env: &Env) -> Result<RateEpoch, ContractError> {
    let ordinal = max_ordinal(env)?;
    get_epoch(env, ordinal).ok_or(ContractError::EpochNotFound)
}

pub fn lock_duration(env: &Env) -> u64 {
    env.storage().instance().get(&LOCK_DURATION).unwrap_or(0)
}

// ── Mutations ───────────────────────────────────────────────────────────────

/// Write epoch 0 and the initial lock duration. Called once from `initialize`.
pub fn seed(env: &Env, initial_rate: u32, initial_duration: u64) -> Result<RateEpoch, ContractError> {
    if initial_rate == 0 || initial_duration == 0 {
        return Err(ContractError::InvalidInput);
    }

    let epoch = RateEpoch {
        ordinal: 0,
        rate_bps: initial_rate,
        effective_at: env.ledger().timestamp(),
    };
    store_epoch(env, &epoch);
    env.storage().instance().set(&EPOCH_COUNT, &1u32);
    env.storage().instance().set(&LOCK_DURATION, &initial_duration);

    Ok(epoch)
}

/// Append a new epoch effective now and replace the lock duration.
///
/// Deposits already locked keep the `matures_at` and `rate_epoch_at_start`
/// they were created with; only future stakes and top-ups see the change.
pub fn advance(env: &Env, new_rate: u32, new_duration: u64) -> Result<RateEpoch, ContractError> {
    if new_rate == 0 || new_duration == 0 {
        return Err(ContractError::InvalidInput);
    }

    let count = epoch_count(env);
    if count == 0 {
        return Err(ContractError::NotInitialized);
    }
    let next_count = count
        .checked_add(1)
        .ok_or(ContractError::ArithmeticOverflow)?;

    let epoch = RateEpoch {
        ordinal: count,
        rate_bps: new_rate,
        effective_at: env.ledger().timestamp(),
    };
    store_epoch(env, &epoch);
    env.storage().instance().set(&EPOCH_COUNT, &next_count);
    env.storage().instance().set(&LOCK_DURATION, &new_duration);

    Ok(epoch)
}

// ── Accrual view ────────────────────────────────────────────────────────────

/// Ledger-backed view handed to the accrual engine.
pub struct StoredHistory<'a> {
    env: &'a Env,
}

impl<'a> StoredHistory<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }
}

impl EpochSource for StoredHistory<'_> {
    fn epoch(&self, ordinal: u32) -> Option<RateEpoch> {
        get_epoch(self.env, ordinal)
    }
}
