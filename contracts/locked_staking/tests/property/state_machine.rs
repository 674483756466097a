#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! State-machine property tests for the staking contract.
//!
//! Random sequences of stakes, top-ups, withdrawals, emergency withdrawals,
//! reward funding, rate changes and clock advances are replayed against a
//! fresh contract. After every step:
//! - `staked_total ≤ cap` and `reward_balance ≥ 0`
//! - the principal of all unpaid deposits sums to `staked_balance`
//! - `participant_count` equals the number of unpaid deposits
//! - custody holds exactly `staked_balance + reward_balance`
//! - an emergency withdrawal never pays more than the principal
//! - a paid deposit can never be withdrawn again

use locked_staking::{ContractError, LockedStakingContract, LockedStakingContractClient};
use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};

const USERS: usize = 4;
const CAP: i128 = 200_000;
const WALLET: i128 = 1_000_000;

#[derive(Clone, Debug)]
enum Op {
    Stake { who: usize, amount: i128 },
    Elapse { secs: u64 },
    Withdraw { who: usize },
    Emergency { who: usize },
    AddReward { amount: i128 },
    SetRate { rate: u32, lock: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..USERS, 1i128..40_000).prop_map(|(who, amount)| Op::Stake { who, amount }),
        3 => (0u64..1_500).prop_map(|secs| Op::Elapse { secs }),
        2 => (0..USERS).prop_map(|who| Op::Withdraw { who }),
        1 => (0..USERS).prop_map(|who| Op::Emergency { who }),
        1 => (1i128..5_000).prop_map(|amount| Op::AddReward { amount }),
        1 => (1u32..5_000, 1u64..2_000).prop_map(|(rate, lock)| Op::SetRate { rate, lock }),
    ]
}

struct Harness {
    env: Env,
    client: LockedStakingContractClient<'static>,
    token: TokenClient<'static>,
    admin: Address,
    funder: Address,
    users: Vec<Address>,
}

fn setup() -> Harness {
    let env = Env::default();
    env.mock_all_auths();

    let token_id = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(LockedStakingContract, ());
    let client = LockedStakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &None, &token_id, &300, &1_000, &CAP);

    let minter = StellarAssetClient::new(&env, &token_id);
    let token = TokenClient::new(&env, &token_id);
    let expiration = env.ledger().sequence() + 10_000;

    let funder = Address::generate(&env);
    let users: Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();
    for holder in users.iter().chain(core::iter::once(&funder)) {
        minter.mint(holder, &WALLET);
        token.approve(holder, &contract_id, &WALLET, &expiration);
    }

    Harness {
        env,
        client,
        token,
        admin,
        funder,
        users,
    }
}

fn check_invariants(h: &Harness) -> Result<(), TestCaseError> {
    let state = h.client.pool_state();
    prop_assert!(state.staked_total <= state.cap);
    prop_assert!(state.reward_balance >= 0);

    let mut live_principal = 0i128;
    let mut live_count = 0u32;
    for user in &h.users {
        if let Some(deposit) = h.client.get_deposit(user) {
            if !deposit.paid {
                live_principal += deposit.principal;
                live_count += 1;
                prop_assert!(deposit.matures_at > deposit.started_at);
                prop_assert!(deposit.rate_epoch_at_start < h.client.get_epoch_count());
            }
        }
    }
    prop_assert_eq!(live_principal, state.staked_balance);
    prop_assert_eq!(live_count, state.participant_count);

    let custody = h.token.balance(&h.client.address);
    prop_assert_eq!(custody, state.staked_balance + state.reward_balance);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_ledger_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let h = setup();
        let mut now = 0u64;

        for op in ops {
            match op {
                Op::Stake { who, amount } => {
                    let _ = h.client.try_stake(&h.users[who], &amount);
                }
                Op::Elapse { secs } => {
                    now += secs;
                    h.env.ledger().set_timestamp(now);
                }
                Op::Withdraw { who } => {
                    let user = &h.users[who];
                    let before = h.client.get_deposit(user);
                    let result = h.client.try_withdraw(user);
                    if let Some(deposit) = before {
                        if deposit.paid {
                            prop_assert!(matches!(result, Err(Ok(ContractError::AlreadyWithdrawn))));
                        } else if let Ok(Ok(paid)) = result {
                            prop_assert!(paid >= deposit.principal);
                        }
                    }
                }
                Op::Emergency { who } => {
                    let user = &h.users[who];
                    let before = h.client.get_deposit(user);
                    let wallet_before = h.token.balance(user);
                    if let Ok(Ok(paid)) = h.client.try_emergency_withdraw(user) {
                        let deposit = before.unwrap();
                        prop_assert_eq!(paid, deposit.principal);
                        prop_assert_eq!(h.token.balance(user) - wallet_before, deposit.principal);
                    }
                }
                Op::AddReward { amount } => {
                    let _ = h.client.try_add_reward(&h.funder, &amount);
                }
                Op::SetRate { rate, lock } => {
                    h.client.set_rate_and_lock_duration(&h.admin, &rate, &lock);
                }
            }
            check_invariants(&h)?;
        }
    }
}
