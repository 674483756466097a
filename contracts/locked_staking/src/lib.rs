#![no_std]

pub mod accrual;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod rate_history;
pub mod token_gateway;

use common::roles::{self, GuardianPolicy, Role};
use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env, Symbol};

pub use ledger::Deposit;
pub use pool::{PoolTotals, RewardPool};
pub use rate_history::RateEpoch;

use rate_history::StoredHistory;
use token_gateway::TokenGateway;

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");
const GUARDIAN: Symbol = symbol_short!("GUARDIAN");
const INITIALIZED: Symbol = symbol_short!("INIT");

const INSTANCE_TTL_THRESHOLD: u32 = 5184000;
const INSTANCE_TTL_EXTEND_TO: u32 = 10368000;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    CapExceeded = 5,
    InsufficientAllowance = 6,
    NoActiveDeposit = 7,
    DepositNotMatured = 8,
    DepositMatured = 9,
    AlreadyWithdrawn = 10,
    InsufficientRewardPool = 11,
    TransferFailed = 12,
    ArithmeticOverflow = 13,
    EpochNotFound = 14,
    NoPendingAdmin = 15,
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Snapshot of the pool returned by `pool_state`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub staked_total: i128,
    pub staked_balance: i128,
    pub reward_balance: i128,
    pub cap: i128,
    pub participant_count: u32,
    pub current_rate: u32,
    pub current_lock_duration: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct LockedStakingContract;

#[contractimpl]
impl LockedStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `guardian`      – separate rate guardian; `None` lets `admin` set rates.
    /// * `token`         – token that is both staked and paid as reward.
    /// * `initial_rate`  – epoch 0 rate in basis points per lock window.
    /// * `lock_duration` – seconds a deposit stays locked.
    /// * `cap`           – ceiling on cumulative stake intake; immutable.
    pub fn initialize(
        env: Env,
        admin: Address,
        guardian: Option<Address>,
        token: Address,
        initial_rate: u32,
        lock_duration: u64,
        cap: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if cap <= 0 {
            return Err(ContractError::InvalidInput);
        }

        rate_history::seed(&env, initial_rate, lock_duration)?;

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        token_gateway::set_token(&env, &token);
        pool::store_totals(&env, &PoolTotals::new(cap));
        pool::store_reward_pool(&env, &RewardPool::default());

        roles::grant_role(&env, &admin, Role::Administrator);
        match &guardian {
            Some(g) => {
                roles::grant_role(&env, g, Role::RateGuardian);
                env.storage().instance().set(&GUARDIAN, g);
                roles::set_policy(&env, GuardianPolicy::Separated);
            }
            None => roles::set_policy(&env, GuardianPolicy::Merged),
        }

        Self::extend_instance_ttl(&env);

        events::publish_initialized(
            &env,
            admin,
            guardian,
            token,
            initial_rate,
            lock_duration,
            cap,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` tokens, or top up an unmatured position.
    ///
    /// A top-up fixes the reward earned so far into `carried_reward` and
    /// restarts the lock for the combined principal under the current epoch
    /// and lock duration. A matured position must be withdrawn first.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<Deposit, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let gateway = TokenGateway::load(&env)?;
        if gateway.allowance_of(&staker) < amount {
            return Err(ContractError::InsufficientAllowance);
        }

        let mut totals = pool::load_totals(&env)?;
        totals.admit(amount)?;

        let now = env.ledger().timestamp();
        let existing = ledger::load_active(&env, &staker);

        // 1. Work out the new position without touching storage.
        let carried_so_far = match &existing {
            Some(deposit) if deposit.is_matured(now) => {
                return Err(ContractError::DepositMatured);
            }
            Some(deposit) => {
                let earned =
                    accrual::compute(&StoredHistory::new(&env), &deposit.window(), now)?;
                Some(
                    deposit
                        .carried_reward
                        .checked_add(earned)
                        .ok_or(ContractError::ArithmeticOverflow)?,
                )
            }
            None => None,
        };

        let principal = match &existing {
            Some(deposit) => deposit
                .principal
                .checked_add(amount)
                .ok_or(ContractError::ArithmeticOverflow)?,
            None => amount,
        };
        let matures_at = now
            .checked_add(rate_history::lock_duration(&env))
            .ok_or(ContractError::ArithmeticOverflow)?;
        let deposit = Deposit {
            owner: staker.clone(),
            principal,
            started_at: now,
            matures_at,
            rate_epoch_at_start: rate_history::max_ordinal(&env)?,
            carried_reward: carried_so_far.unwrap_or(0),
            paid: false,
        };

        // 2. Pull tokens; nothing has been written yet if this fails.
        if !gateway.transfer_in(&staker, amount) {
            return Err(ContractError::TransferFailed);
        }

        // 3. Record the position and the pool counters.
        if existing.is_none() {
            totals.enroll();
        }
        ledger::store(&env, &deposit);
        pool::store_totals(&env, &totals);
        Self::extend_instance_ttl(&env);

        match carried_so_far {
            Some(carried) => events::publish_topped_up(
                &env,
                staker,
                amount,
                deposit.principal,
                carried,
                deposit.matures_at,
                deposit.rate_epoch_at_start,
            ),
            None => events::publish_staked(
                &env,
                staker,
                amount,
                deposit.matures_at,
                deposit.rate_epoch_at_start,
                totals.staked_total,
            ),
        }

        Ok(deposit)
    }

    // ── Withdrawal ──────────────────────────────────────────────────────────

    /// Pay out a matured position: principal plus the reward accrued to
    /// maturity plus any carried reward. Returns the amount paid.
    ///
    /// Fails with `InsufficientRewardPool` when the pool cannot cover the
    /// whole reward; nothing is paid in that case.
    pub fn withdraw(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let deposit = Self::matured_deposit(&env, &staker)?;

        let accrued = accrual::compute(
            &StoredHistory::new(&env),
            &deposit.window(),
            deposit.matures_at,
        )?;
        let reward = accrued
            .checked_add(deposit.carried_reward)
            .ok_or(ContractError::ArithmeticOverflow)?;

        let mut reward_pool = pool::load_reward_pool(&env);
        reward_pool.debit(reward)?;

        let payout = deposit
            .principal
            .checked_add(reward)
            .ok_or(ContractError::ArithmeticOverflow)?;

        Self::settle(&env, &deposit, Some(&reward_pool), payout)?;

        events::publish_withdrawn(&env, staker, deposit.principal, reward);

        Ok(payout)
    }

    /// Pay out a matured position as principal only. Accrued and carried
    /// reward are forfeited and the reward pool is left untouched.
    pub fn emergency_withdraw(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let deposit = Self::matured_deposit(&env, &staker)?;

        Self::settle(&env, &deposit, None, deposit.principal)?;

        events::publish_emergency_withdrawn(
            &env,
            staker,
            deposit.principal,
            deposit.carried_reward,
        );

        Ok(deposit.principal)
    }

    // ── Reward pool ─────────────────────────────────────────────────────────

    /// Move `amount` approved tokens from `funder` into the reward pool.
    pub fn add_reward(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        funder.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let gateway = TokenGateway::load(&env)?;
        if gateway.allowance_of(&funder) < amount {
            return Err(ContractError::InsufficientAllowance);
        }

        let mut reward_pool = pool::load_reward_pool(&env);
        reward_pool.fund(amount)?;

        if !gateway.transfer_in(&funder, amount) {
            return Err(ContractError::TransferFailed);
        }

        pool::store_reward_pool(&env, &reward_pool);
        Self::extend_instance_ttl(&env);

        events::publish_reward_added(&env, funder, amount, reward_pool.balance);

        Ok(())
    }

    // ── Rate guardian ───────────────────────────────────────────────────────

    /// Open a new rate epoch effective now and set the lock duration for
    /// future deposits.
    ///
    /// Requires the `RateGuardian` role under the active guardian policy.
    pub fn set_rate_and_lock_duration(
        env: Env,
        caller: Address,
        rate_bps: u32,
        lock_duration: u64,
    ) -> Result<RateEpoch, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::RateGuardian)?;

        let epoch = rate_history::advance(&env, rate_bps, lock_duration)?;
        Self::extend_instance_ttl(&env);

        events::publish_epoch_advanced(&env, &epoch, lock_duration);

        Ok(epoch)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the account's deposit record, including a paid one.
    pub fn get_deposit(env: Env, account: Address) -> Option<Deposit> {
        ledger::load(&env, &account)
    }

    /// Reward the account's unpaid deposit will have earned at maturity under
    /// the rate history known now, plus carried reward. Principal is not
    /// included. Returns 0 when there is no unpaid deposit.
    pub fn pending_reward(env: Env, account: Address) -> Result<i128, ContractError> {
        let deposit = match ledger::load_active(&env, &account) {
            Some(deposit) => deposit,
            None => return Ok(0),
        };
        let accrued = accrual::compute(
            &StoredHistory::new(&env),
            &deposit.window(),
            deposit.matures_at,
        )?;
        accrued
            .checked_add(deposit.carried_reward)
            .ok_or(ContractError::ArithmeticOverflow)
    }

    pub fn pool_state(env: Env) -> Result<PoolState, ContractError> {
        let totals = pool::load_totals(&env)?;
        let reward_pool = pool::load_reward_pool(&env);
        let epoch = rate_history::current_epoch(&env)?;

        Ok(PoolState {
            staked_total: totals.staked_total,
            staked_balance: totals.staked_balance,
            reward_balance: reward_pool.balance,
            cap: totals.cap,
            participant_count: totals.participant_count,
            current_rate: epoch.rate_bps,
            current_lock_duration: rate_history::lock_duration(&env),
        })
    }

    pub fn get_reward_pool(env: Env) -> RewardPool {
        pool::load_reward_pool(&env)
    }

    pub fn get_participant_count(env: Env) -> u32 {
        pool::load_totals(&env)
            .map(|totals| totals.participant_count)
            .unwrap_or(0)
    }

    pub fn get_rate_epoch(env: Env, ordinal: u32) -> Option<RateEpoch> {
        rate_history::get_epoch(&env, ordinal)
    }

    pub fn get_current_epoch(env: Env) -> Result<RateEpoch, ContractError> {
        rate_history::current_epoch(&env)
    }

    pub fn get_epoch_count(env: Env) -> u32 {
        rate_history::epoch_count(&env)
    }

    pub fn get_lock_duration(env: Env) -> u64 {
        rate_history::lock_duration(&env)
    }

    pub fn get_token(env: Env) -> Result<Address, ContractError> {
        token_gateway::get_token(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Guardian management ─────────────────────────────────────────────────

    /// Appoint `guardian` as the only address allowed to change rates,
    /// replacing any previous guardian. Only the administrator can call this.
    pub fn set_guardian(env: Env, admin: Address, guardian: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        admin.require_auth();
        Self::require_role(&env, &admin, Role::Administrator)?;

        if let Some(previous) = env.storage().instance().get::<Symbol, Address>(&GUARDIAN) {
            roles::revoke_role(&env, &previous, Role::RateGuardian);
        }
        roles::grant_role(&env, &guardian, Role::RateGuardian);
        roles::set_policy(&env, GuardianPolicy::Separated);
        env.storage().instance().set(&GUARDIAN, &guardian);

        events::publish_guardian_changed(&env, admin, Some(guardian));

        Ok(())
    }

    /// Remove the dedicated guardian; the administrator sets rates again.
    pub fn clear_guardian(env: Env, admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        admin.require_auth();
        Self::require_role(&env, &admin, Role::Administrator)?;

        if let Some(previous) = env.storage().instance().get::<Symbol, Address>(&GUARDIAN) {
            roles::revoke_role(&env, &previous, Role::RateGuardian);
        }
        env.storage().instance().remove(&GUARDIAN);
        roles::set_policy(&env, GuardianPolicy::Merged);

        events::publish_guardian_changed(&env, admin, None);

        Ok(())
    }

    pub fn get_guardian(env: Env) -> Option<Address> {
        env.storage().instance().get(&GUARDIAN)
    }

    pub fn get_guardian_policy(env: Env) -> GuardianPolicy {
        roles::policy(&env)
    }

    // ── Admin transfer (two-step) ──────────────────────────────────────────

    /// Propose a new admin address. Only the current admin can call this.
    /// The new admin must call `accept_admin` to complete the transfer.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_role(&env, &current_admin, Role::Administrator)?;

        env.storage().instance().set(&PENDING_ADMIN, &new_admin);

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);

        Ok(())
    }

    /// Accept the pending admin transfer. Only the proposed new admin can call this.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_admin.require_auth();

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::NoPendingAdmin)?;

        if new_admin != pending {
            return Err(ContractError::Unauthorized);
        }

        let old_admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;

        roles::revoke_role(&env, &old_admin, Role::Administrator);
        roles::grant_role(&env, &new_admin, Role::Administrator);
        env.storage().instance().set(&ADMIN, &new_admin);
        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);

        Ok(())
    }

    /// Cancel a pending admin transfer. Only the current admin can call this.
    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_role(&env, &current_admin, Role::Administrator)?;

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::NoPendingAdmin)?;

        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_cancelled(&env, current_admin, pending);

        Ok(())
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENDING_ADMIN)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` may not act as `role` under the active policy.
    fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), ContractError> {
        if !roles::is_authorized(env, caller, role) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }

    /// Load the caller's deposit and check it can be withdrawn now.
    fn matured_deposit(env: &Env, staker: &Address) -> Result<Deposit, ContractError> {
        let deposit = ledger::load(env, staker).ok_or(ContractError::NoActiveDeposit)?;
        if deposit.paid {
            return Err(ContractError::AlreadyWithdrawn);
        }
        if !deposit.is_matured(env.ledger().timestamp()) {
            return Err(ContractError::DepositNotMatured);
        }
        Ok(deposit)
    }

    /// Mark `deposit` paid, release its principal, store the debited reward
    /// pool if any, then transfer `payout`.
    ///
    /// A re-entrant call during the transfer sees a paid deposit. A failed
    /// transfer restores every write.
    fn settle(
        env: &Env,
        deposit: &Deposit,
        debited_pool: Option<&RewardPool>,
        payout: i128,
    ) -> Result<(), ContractError> {
        let gateway = TokenGateway::load(env)?;
        let totals_before = pool::load_totals(env)?;
        let pool_before = pool::load_reward_pool(env);

        let mut totals = totals_before.clone();
        totals.release(deposit.principal)?;
        let settled = Deposit {
            paid: true,
            ..deposit.clone()
        };

        ledger::store(env, &settled);
        pool::store_totals(env, &totals);
        if let Some(debited) = debited_pool {
            pool::store_reward_pool(env, debited);
        }

        if !gateway.transfer_out(&deposit.owner, payout) {
            ledger::store(env, deposit);
            pool::store_totals(env, &totals_before);
            pool::store_reward_pool(env, &pool_before);
            return Err(ContractError::TransferFailed);
        }

        Self::extend_instance_ttl(env);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_roles;
