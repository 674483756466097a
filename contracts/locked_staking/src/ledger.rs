use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::accrual::AccrualWindow;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Types ───────────────────────────────────────────────────────────────────

/// A depositor's locked position.
///
/// `matures_at - started_at` is the lock duration that was in force when the
/// window was last (re)opened. `paid` is set once the position has been
/// withdrawn; the record is kept so that repeat withdrawals are rejected.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub owner: Address,
    pub principal: i128,
    pub started_at: u64,
    pub matures_at: u64,
    /// Highest epoch ordinal at the moment the window opened.
    pub rate_epoch_at_start: u32,
    /// Reward fixed at earlier top-ups, paid out on top of ongoing accrual.
    pub carried_reward: i128,
    pub paid: bool,
}

impl Deposit {
    pub fn is_active(&self) -> bool {
        !self.paid
    }

    pub fn is_matured(&self, now: u64) -> bool {
        now >= self.matures_at
    }

    pub fn window(&self) -> AccrualWindow {
        AccrualWindow {
            principal: self.principal,
            started_at: self.started_at,
            matures_at: self.matures_at,
            rate_epoch_at_start: self.rate_epoch_at_start,
        }
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn deposit_key(owner: &Address) -> (Symbol, Address) {
    (symbol_short!("DEPOSIT"), owner.clone())
}

/// Persist a `Deposit` under its owner.
pub fn store(env: &Env, deposit: &Deposit) {
    let key = deposit_key(&deposit.owner);
    env.storage().persistent().set(&key, deposit);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Retrieve the deposit held by `owner`, paid or not.
pub fn load(env: &Env, owner: &Address) -> Option<Deposit> {
    let key = deposit_key(owner);
    let deposit: Option<Deposit> = env.storage().persistent().get(&key);
    if deposit.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    deposit
}

/// Retrieve the deposit only while it is still unpaid.
pub fn load_active(env: &Env, owner: &Address) -> Option<Deposit> {
    load(env, owner).filter(Deposit::is_active)
}
