#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::rate_history::RateEpoch;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub guardian: Option<Address>,
    pub token: Address,
    pub initial_rate: u32,
    pub lock_duration: u64,
    pub cap: i128,
    pub timestamp: u64,
}

/// Fired when a depositor opens a new locked position.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub matures_at: u64,
    pub rate_epoch: u32,
    pub new_staked_total: i128,
    pub timestamp: u64,
}

/// Fired when an unmatured position is topped up and its lock restarted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToppedUpEvent {
    pub staker: Address,
    pub amount: i128,
    pub principal: i128,
    pub carried_reward: i128,
    pub matures_at: u64,
    pub rate_epoch: u32,
    pub timestamp: u64,
}

/// Fired when a matured position is paid out with its reward.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub principal: i128,
    pub reward: i128,
    pub timestamp: u64,
}

/// Fired when a position is paid out as principal only.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub staker: Address,
    pub principal: i128,
    /// Carried reward discarded with the position.
    pub forfeited_reward: i128,
    pub timestamp: u64,
}

/// Fired when anyone tops up the reward pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardAddedEvent {
    pub funder: Address,
    pub amount: i128,
    pub pool_balance: i128,
    pub timestamp: u64,
}

/// Fired when the guardian opens a new rate epoch.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EpochAdvancedEvent {
    pub ordinal: u32,
    pub rate_bps: u32,
    pub lock_duration: u64,
    pub effective_at: u64,
}

/// Fired when the administrator appoints or removes the rate guardian.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardianChangedEvent {
    pub admin: Address,
    pub guardian: Option<Address>,
    pub timestamp: u64,
}

/// Fired when an admin transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferProposedEvent {
    pub current_admin: Address,
    pub proposed_admin: Address,
    pub timestamp: u64,
}

/// Fired when an admin transfer is accepted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferAcceptedEvent {
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

/// Fired when a pending admin transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferCancelledEvent {
    pub admin: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    guardian: Option<Address>,
    token: Address,
    initial_rate: u32,
    lock_duration: u64,
    cap: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            guardian,
            token,
            initial_rate,
            lock_duration,
            cap,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    amount: i128,
    matures_at: u64,
    rate_epoch: u32,
    new_staked_total: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            matures_at,
            rate_epoch,
            new_staked_total,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_topped_up(
    env: &Env,
    staker: Address,
    amount: i128,
    principal: i128,
    carried_reward: i128,
    matures_at: u64,
    rate_epoch: u32,
) {
    env.events().publish(
        (symbol_short!("TOPPED_UP"), staker.clone()),
        ToppedUpEvent {
            staker,
            amount,
            principal,
            carried_reward,
            matures_at,
            rate_epoch,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, principal: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            principal,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdrawn(
    env: &Env,
    staker: Address,
    principal: i128,
    forfeited_reward: i128,
) {
    env.events().publish(
        (symbol_short!("EMRG_WDRW"), staker.clone()),
        EmergencyWithdrawnEvent {
            staker,
            principal,
            forfeited_reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_added(env: &Env, funder: Address, amount: i128, pool_balance: i128) {
    env.events().publish(
        (symbol_short!("RWD_ADDED"), funder.clone()),
        RewardAddedEvent {
            funder,
            amount,
            pool_balance,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_epoch_advanced(env: &Env, epoch: &RateEpoch, lock_duration: u64) {
    env.events().publish(
        (symbol_short!("EPOCH"), epoch.ordinal),
        EpochAdvancedEvent {
            ordinal: epoch.ordinal,
            rate_bps: epoch.rate_bps,
            lock_duration,
            effective_at: epoch.effective_at,
        },
    );
}

pub fn publish_guardian_changed(env: &Env, admin: Address, guardian: Option<Address>) {
    env.events().publish(
        (symbol_short!("GUARD_SET"), admin.clone()),
        GuardianChangedEvent {
            admin,
            guardian,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_proposed(env: &Env, current_admin: Address, proposed_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), current_admin.clone()),
        AdminTransferProposedEvent {
            current_admin,
            proposed_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_accepted(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_ACPT"), new_admin.clone()),
        AdminTransferAcceptedEvent {
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_cancelled(env: &Env, admin: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("ADM_CNCL"), admin.clone()),
        AdminTransferCancelledEvent {
            admin,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
