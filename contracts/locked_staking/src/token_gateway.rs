use soroban_sdk::{symbol_short, token, Address, Env, Symbol};

use crate::ContractError;

const TOKEN: Symbol = symbol_short!("TOKEN");

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&TOKEN, token);
}

pub fn get_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&TOKEN)
        .ok_or(ContractError::NotInitialized)
}

/// The custodied token as seen from this contract.
///
/// Transfers go through the client's `try_*` calls so that a failing token
/// contract is reported as `false` instead of aborting the invocation.
pub struct TokenGateway<'a> {
    client: token::Client<'a>,
    custody: Address,
}

impl<'a> TokenGateway<'a> {
    pub fn load(env: &'a Env) -> Result<Self, ContractError> {
        let token = get_token(env)?;
        Ok(Self {
            client: token::Client::new(env, &token),
            custody: env.current_contract_address(),
        })
    }

    /// Amount `owner` has approved this contract to pull.
    pub fn allowance_of(&self, owner: &Address) -> i128 {
        self.client.allowance(owner, &self.custody)
    }

    /// Pull previously approved tokens from `from` into custody.
    pub fn transfer_in(&self, from: &Address, amount: i128) -> bool {
        matches!(
            self.client
                .try_transfer_from(&self.custody, from, &self.custody, &amount),
            Ok(Ok(()))
        )
    }

    /// Pay `amount` out of custody to `to`.
    pub fn transfer_out(&self, to: &Address, amount: i128) -> bool {
        matches!(
            self.client.try_transfer(&self.custody, to, &amount),
            Ok(Ok(()))
        )
    }
}
