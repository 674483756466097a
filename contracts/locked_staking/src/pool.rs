use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::ContractError;

// ── Storage key constants ───────────────────────────────────────────────────

const TOTALS: Symbol = symbol_short!("TOTALS");
const REWARD_POOL: Symbol = symbol_short!("RWD_POOL");

// ── Types ───────────────────────────────────────────────────────────────────

/// Unattributed balance reserved for interest payouts.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPool {
    pub balance: i128,
    pub total_funded: i128,
}

/// Pool-wide staking counters.
///
/// `staked_total` is cumulative intake and never decreases, so `cap` bounds
/// everything ever staked. `staked_balance` is principal currently locked.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolTotals {
    pub staked_total: i128,
    pub staked_balance: i128,
    pub participant_count: u32,
    pub cap: i128,
}

impl RewardPool {
    pub fn fund(&mut self, amount: i128) -> Result<(), ContractError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        self.total_funded = self
            .total_funded
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Take `reward` out of the pool, refusing outright if it does not fit.
    pub fn debit(&mut self, reward: i128) -> Result<(), ContractError> {
        if reward > self.balance {
            return Err(ContractError::InsufficientRewardPool);
        }
        self.balance -= reward;
        Ok(())
    }
}

impl PoolTotals {
    pub fn new(cap: i128) -> Self {
        Self {
            staked_total: 0,
            staked_balance: 0,
            participant_count: 0,
            cap,
        }
    }

    /// Fails with `CapExceeded` if accepting `amount` would push cumulative
    /// intake past the cap.
    pub fn ensure_capacity(&self, amount: i128) -> Result<(), ContractError> {
        let next = self
            .staked_total
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        if next > self.cap {
            return Err(ContractError::CapExceeded);
        }
        Ok(())
    }

    pub fn admit(&mut self, amount: i128) -> Result<(), ContractError> {
        self.ensure_capacity(amount)?;
        self.staked_total += amount;
        self.staked_balance = self
            .staked_balance
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn enroll(&mut self) {
        self.participant_count = self.participant_count.saturating_add(1);
    }

    /// Drop a settled deposit's principal and its participant slot.
    pub fn release(&mut self, principal: i128) -> Result<(), ContractError> {
        let staked_balance = self
            .staked_balance
            .checked_sub(principal)
            .filter(|balance| *balance >= 0)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let participant_count = self
            .participant_count
            .checked_sub(1)
            .ok_or(ContractError::ArithmeticOverflow)?;
        self.staked_balance = staked_balance;
        self.participant_count = participant_count;
        Ok(())
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

pub fn load_totals(env: &Env) -> Result<PoolTotals, ContractError> {
    env.storage()
        .instance()
        .get(&TOTALS)
        .ok_or(ContractError::NotInitialized)
}

pub fn store_totals(env: &Env, totals: &PoolTotals) {
    env.storage().instance().set(&TOTALS, totals);
}

pub fn load_reward_pool(env: &Env) -> RewardPool {
    env.storage()
        .instance()
        .get(&REWARD_POOL)
        .unwrap_or_default()
}

pub fn store_reward_pool(env: &Env, pool: &RewardPool) {
    env.storage().instance().set(&REWARD_POOL, pool);
}
