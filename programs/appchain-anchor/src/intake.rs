//! Stake deposits carrying a JSON-encoded staking intent.
//!
//! The intent is externally tagged, e.g. `"IncreaseStake"` or
//! `{"RegisterDelegator":{"validator_id":"<base58 pubkey>"}}`.

use crate::error::CustomErrorCode;
use crate::history::StakingHistory;
use crate::ledger::ValidatorRegistration;
use crate::state::AnchorState;
use anchor_lang::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const MAX_INTENT_LEN: usize = 8 * 1024;

#[derive(Deserialize, Debug, PartialEq, Eq)]
pub enum StakingIntent {
    RegisterValidator {
        validator_id_in_appchain: String,
        can_be_delegated_to: bool,
        #[serde(default)]
        profile: BTreeMap<String, String>,
    },
    IncreaseStake,
    RegisterDelegator {
        validator_id: String,
    },
    IncreaseDelegation {
        validator_id: String,
    },
}

impl StakingIntent {
    pub fn decode(msg: &str) -> Result<Self> {
        require!(msg.len() <= MAX_INTENT_LEN, CustomErrorCode::MalformedIntent);
        serde_json::from_str(msg).map_err(|_| CustomErrorCode::MalformedIntent.into())
    }
}

fn parse_validator_id(validator_id: &str) -> Result<Pubkey> {
    Pubkey::from_str(validator_id).map_err(|_| CustomErrorCode::MalformedIntent.into())
}

impl AnchorState {
    /// Applies the intent in `msg` to `amount` tokens already deposited by `sender`.
    /// An error rejects the deposit as a whole.
    pub fn process_stake_deposit(
        &mut self,
        sender: &Pubkey,
        amount: u64,
        msg: &str,
        now: i64,
    ) -> Result<StakingHistory> {
        match StakingIntent::decode(msg)? {
            StakingIntent::RegisterValidator {
                validator_id_in_appchain,
                can_be_delegated_to,
                profile,
            } => self.register_validator(
                ValidatorRegistration {
                    validator_id: *sender,
                    validator_id_in_appchain,
                    amount,
                    can_be_delegated_to,
                    profile,
                },
                now,
            ),
            StakingIntent::IncreaseStake => self.increase_stake(sender, amount, now),
            StakingIntent::RegisterDelegator { validator_id } => {
                let validator_id = parse_validator_id(&validator_id)?;
                self.register_delegator(sender, &validator_id, amount, now)
            }
            StakingIntent::IncreaseDelegation { validator_id } => {
                let validator_id = parse_validator_id(&validator_id)?;
                self.increase_delegation(sender, &validator_id, amount, now)
            }
        }
    }
}
