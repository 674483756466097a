use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ROLE_PREFIX: Symbol = symbol_short!("ROLE");
const POLICY: Symbol = symbol_short!("G_POLICY");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Roles ────────────────────────────────────────────────────────────────────

/// Privileged roles recognised by the staking suite.
///
/// - `Administrator` – owns the contract: hands over ownership and appoints
///                     or removes the rate guardian.
/// - `RateGuardian`  – may append a new interest epoch and change the lock
///                     duration for future deposits.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Administrator = 1,
    RateGuardian = 2,
}

/// How `RateGuardian` checks are resolved.
///
/// Under `Merged` the administrator also acts as guardian. Under `Separated`
/// only an address explicitly holding `RateGuardian` passes.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GuardianPolicy {
    Merged = 1,
    Separated = 2,
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn role_key(role: Role, holder: &Address) -> (Symbol, Role, Address) {
    (ROLE_PREFIX, role, holder.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Role, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core Functions ───────────────────────────────────────────────────────────

/// Grants `role` to `holder`.
/// Callers must verify authorization beforehand.
pub fn grant_role(env: &Env, holder: &Address, role: Role) {
    let key = role_key(role, holder);
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
}

pub fn revoke_role(env: &Env, holder: &Address, role: Role) {
    env.storage().persistent().remove(&role_key(role, holder));
}

/// Returns true if `holder` was granted `role` directly, ignoring the policy.
pub fn has_role(env: &Env, holder: &Address, role: Role) -> bool {
    let key = role_key(role, holder);
    let granted: bool = env.storage().persistent().get(&key).unwrap_or(false);
    if granted {
        extend_ttl(env, &key);
    }
    granted
}

pub fn set_policy(env: &Env, policy: GuardianPolicy) {
    env.storage().instance().set(&POLICY, &policy);
}

/// Returns the active guardian policy. Contracts that never configured one
/// behave as `Merged`.
pub fn policy(env: &Env) -> GuardianPolicy {
    env.storage()
        .instance()
        .get(&POLICY)
        .unwrap_or(GuardianPolicy::Merged)
}

/// Guard: returns `false` when `caller` may not act as `role`.
///
/// The caller must have already been authenticated via `require_auth()`.
pub fn is_authorized(env: &Env, caller: &Address, role: Role) -> bool {
    match (role, policy(env)) {
        (Role::Administrator, _) => has_role(env, caller, Role::Administrator),
        (Role::RateGuardian, GuardianPolicy::Merged) => {
            has_role(env, caller, Role::Administrator)
        }
        (Role::RateGuardian, GuardianPolicy::Separated) => {
            has_role(env, caller, Role::RateGuardian)
        }
    }
}
