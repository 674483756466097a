extern crate std;

use common::roles::GuardianPolicy;
use soroban_sdk::{testutils::Address as _, Address, Env};

use crate::{ContractError, LockedStakingContract, LockedStakingContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Deploys the contract; with `separate_guardian` a dedicated guardian is
/// appointed at initialisation and returned.
fn setup(
    separate_guardian: bool,
) -> (
    Env,
    LockedStakingContractClient<'static>,
    Address,         // admin
    Option<Address>, // guardian
) {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(LockedStakingContract, ());
    let client = LockedStakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    let guardian = separate_guardian.then(|| Address::generate(&env));
    client.initialize(&admin, &guardian, &token, &100, &86_400, &1_000_000);

    (env, client, admin, guardian)
}

fn expect_unauthorized<T, C>(
    result: Result<Result<T, C>, Result<ContractError, soroban_sdk::InvokeError>>,
) {
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Guardian policy ──────────────────────────────────────────────────────────

#[test]
fn test_admin_sets_rate_under_merged_policy() {
    let (_env, client, admin, _) = setup(false);

    assert_eq!(client.get_guardian_policy(), GuardianPolicy::Merged);
    assert_eq!(client.get_guardian(), None);

    client.set_rate_and_lock_duration(&admin, &200, &3_600);
    assert_eq!(client.get_current_epoch().rate_bps, 200);
}

#[test]
fn test_guardian_from_initialize_is_separated() {
    let (_env, client, admin, guardian) = setup(true);
    let guardian = guardian.unwrap();

    assert_eq!(client.get_guardian_policy(), GuardianPolicy::Separated);
    assert_eq!(client.get_guardian(), Some(guardian.clone()));

    // The admin does not pass the guardian check.
    expect_unauthorized(client.try_set_rate_and_lock_duration(&admin, &200, &3_600));

    client.set_rate_and_lock_duration(&guardian, &200, &3_600);
    assert_eq!(client.get_epoch_count(), 2);
}

#[test]
fn test_set_guardian_separates_roles() {
    let (env, client, admin, _) = setup(false);
    let guardian = Address::generate(&env);
    client.set_guardian(&admin, &guardian);

    assert_eq!(client.get_guardian_policy(), GuardianPolicy::Separated);
    expect_unauthorized(client.try_set_rate_and_lock_duration(&admin, &200, &3_600));
    client.set_rate_and_lock_duration(&guardian, &200, &3_600);
}

#[test]
fn test_replacing_guardian_revokes_previous() {
    let (env, client, admin, _) = setup(false);
    let first = Address::generate(&env);
    let second = Address::generate(&env);

    client.set_guardian(&admin, &first);
    client.set_guardian(&admin, &second);

    expect_unauthorized(client.try_set_rate_and_lock_duration(&first, &200, &3_600));
    client.set_rate_and_lock_duration(&second, &200, &3_600);
}

#[test]
fn test_clear_guardian_restores_admin() {
    let (env, client, admin, _) = setup(false);
    let guardian = Address::generate(&env);

    client.set_guardian(&admin, &guardian);
    client.clear_guardian(&admin);

    assert_eq!(client.get_guardian_policy(), GuardianPolicy::Merged);
    assert_eq!(client.get_guardian(), None);
    expect_unauthorized(client.try_set_rate_and_lock_duration(&guardian, &200, &3_600));
    client.set_rate_and_lock_duration(&admin, &200, &3_600);
}

#[test]
fn test_guardian_cannot_manage_guardians() {
    let (env, client, admin, _) = setup(false);
    let guardian = Address::generate(&env);
    client.set_guardian(&admin, &guardian);

    expect_unauthorized(client.try_set_guardian(&guardian, &Address::generate(&env)));
    expect_unauthorized(client.try_clear_guardian(&guardian));
    expect_unauthorized(client.try_propose_admin(&guardian, &guardian));
}

// ── Admin transfer ───────────────────────────────────────────────────────────

#[test]
fn test_two_step_admin_transfer() {
    let (env, client, admin, _) = setup(false);
    let successor = Address::generate(&env);

    client.propose_admin(&admin, &successor);
    assert_eq!(client.get_pending_admin(), Some(successor.clone()));

    client.accept_admin(&successor);
    assert_eq!(client.get_admin(), successor);
    assert_eq!(client.get_pending_admin(), None);

    // Old admin lost every privilege; the successor holds them.
    expect_unauthorized(client.try_set_rate_and_lock_duration(&admin, &200, &3_600));
    client.set_rate_and_lock_duration(&successor, &200, &3_600);
}

#[test]
fn test_accept_by_wrong_address_fails() {
    let (env, client, admin, _) = setup(false);
    let successor = Address::generate(&env);
    client.propose_admin(&admin, &successor);

    expect_unauthorized(client.try_accept_admin(&Address::generate(&env)));
    assert_eq!(client.get_admin(), admin);
}

#[test]
fn test_cancel_admin_transfer() {
    let (env, client, admin, _) = setup(false);
    let successor = Address::generate(&env);
    client.propose_admin(&admin, &successor);
    client.cancel_admin_transfer(&admin);

    assert_eq!(client.get_pending_admin(), None);
    let result = client.try_accept_admin(&successor);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::NoPendingAdmin),
        _ => unreachable!("Expected NoPendingAdmin error"),
    }
}
