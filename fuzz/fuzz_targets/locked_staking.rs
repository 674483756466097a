#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use locked_staking::{LockedStakingContract, LockedStakingContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { user: u8, amount: u64 },
    Withdraw { user: u8 },
    EmergencyWithdraw { user: u8 },
    AddReward { amount: u64 },
    SetRate { rate: u32, lock: u32 },
    Elapse { secs: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let token_id = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(LockedStakingContract, ());
    let client = LockedStakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &None, &token_id, &1_000u32, &3_600u64, &i128::MAX);

    let minter = StellarAssetClient::new(&env, &token_id);
    let token = TokenClient::new(&env, &token_id);
    let expiration = env.ledger().sequence() + 10_000;

    let mut users = vec![admin.clone()];
    for _ in 0..5 {
        users.push(Address::generate(&env));
    }
    for user in &users {
        minter.mint(user, &(u64::MAX as i128));
        token.approve(user, &contract_id, &(u64::MAX as i128), &expiration);
    }

    // Looking for unhandled panics (overflow, missing epochs) rather than
    // specific outcomes; every call goes through try_*.
    let mut now = 0u64;
    for action in actions {
        match action {
            FuzzAction::Stake { user, amount } => {
                let caller = &users[user as usize % users.len()];
                let _ = client.try_stake(caller, &(amount as i128));
            }
            FuzzAction::Withdraw { user } => {
                let _ = client.try_withdraw(&users[user as usize % users.len()]);
            }
            FuzzAction::EmergencyWithdraw { user } => {
                let _ = client.try_emergency_withdraw(&users[user as usize % users.len()]);
            }
            FuzzAction::AddReward { amount } => {
                let _ = client.try_add_reward(&admin, &(amount as i128));
            }
            FuzzAction::SetRate { rate, lock } => {
                let _ = client.try_set_rate_and_lock_duration(&admin, &rate, &u64::from(lock));
            }
            FuzzAction::Elapse { secs } => {
                now = now.saturating_add(u64::from(secs));
                env.ledger().set_timestamp(now);
            }
        }
    }

    let state = client.pool_state();
    assert!(state.staked_total <= state.cap);
    assert!(state.reward_balance >= 0);
});
