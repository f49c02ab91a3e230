//! Append-only log of staking facts.
//!
//! The facts themselves live in one `StakingHistory` account per index; the
//! log kept in the anchor state only tracks the index range and, per account,
//! which indexes that account produced.

use crate::error::CustomErrorCode;
use crate::ledger::MAX_VALIDATOR_ID_IN_APPCHAIN_LEN;
use anchor_lang::prelude::*;

/// Index assigned to the first fact ever recorded.
pub const GENESIS_INDEX: u64 = 0;

/// One completed stake-affecting action.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum StakingFact {
    ValidatorRegistered {
        validator_id: Pubkey,
        validator_id_in_appchain: String,
        amount: u64,
        can_be_delegated_to: bool,
    },
    StakeIncreased {
        validator_id: Pubkey,
        amount: u64,
    },
    StakeDecreased {
        validator_id: Pubkey,
        amount: u64,
    },
    ValidatorUnbonded {
        validator_id: Pubkey,
        amount: u64,
    },
    ValidatorDelegationEnabled {
        validator_id: Pubkey,
    },
    ValidatorDelegationDisabled {
        validator_id: Pubkey,
    },
    DelegatorRegistered {
        delegator_id: Pubkey,
        validator_id: Pubkey,
        amount: u64,
    },
    DelegationIncreased {
        delegator_id: Pubkey,
        validator_id: Pubkey,
        amount: u64,
    },
    DelegationDecreased {
        delegator_id: Pubkey,
        validator_id: Pubkey,
        amount: u64,
    },
    DelegatorUnbonded {
        delegator_id: Pubkey,
        validator_id: Pubkey,
        amount: u64,
    },
}

impl StakingFact {
    /// Serialized size of the largest variant (`ValidatorRegistered`).
    pub const MAX_LEN: usize = 1 + 32 + (4 + MAX_VALIDATOR_ID_IN_APPCHAIN_LEN) + 8 + 1;

    /// The account whose action produced this fact.
    pub fn account_id(&self) -> Pubkey {
        match self {
            StakingFact::ValidatorRegistered { validator_id, .. }
            | StakingFact::StakeIncreased { validator_id, .. }
            | StakingFact::StakeDecreased { validator_id, .. }
            | StakingFact::ValidatorUnbonded { validator_id, .. }
            | StakingFact::ValidatorDelegationEnabled { validator_id }
            | StakingFact::ValidatorDelegationDisabled { validator_id } => *validator_id,
            StakingFact::DelegatorRegistered { delegator_id, .. }
            | StakingFact::DelegationIncreased { delegator_id, .. }
            | StakingFact::DelegationDecreased { delegator_id, .. }
            | StakingFact::DelegatorUnbonded { delegator_id, .. } => *delegator_id,
        }
    }
}

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct StakingHistory {
    pub index: u64,
    pub staking_fact: StakingFact,
    pub timestamp: i64,
    pub era_number: u64,
}

impl StakingHistory {
    pub const LEN: usize = 8 + 8 + StakingFact::MAX_LEN + 8 + 8;
}

/// `end_index` is `None` until the first fact is appended.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    pub start_index: u64,
    pub end_index: Option<u64>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserStakingHistoryIndexes {
    pub account_id: Pubkey,
    pub indexes: Vec<u64>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakingHistoryLog {
    start_index: u64,
    next_index: u64,
    user_indexes: Vec<UserStakingHistoryIndexes>,
}

impl Default for StakingHistoryLog {
    fn default() -> Self {
        Self {
            start_index: GENESIS_INDEX,
            next_index: GENESIS_INDEX,
            user_indexes: Vec::new(),
        }
    }
}

impl StakingHistoryLog {
    /// The index the next appended fact will receive.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn index_range(&self) -> IndexRange {
        IndexRange {
            start_index: self.start_index,
            end_index: (self.next_index > self.start_index).then(|| self.next_index - 1),
        }
    }

    /// Assigns the next index to `staking_fact` and returns the record to persist.
    pub fn append(
        &mut self,
        staking_fact: StakingFact,
        timestamp: i64,
        era_number: u64,
    ) -> Result<StakingHistory> {
        let index = self.next_index;
        self.next_index = index
            .checked_add(1)
            .ok_or(CustomErrorCode::IndexOutOfRange)?;

        let account_id = staking_fact.account_id();
        match self
            .user_indexes
            .iter_mut()
            .find(|user| user.account_id == account_id)
        {
            Some(user) => user.indexes.push(index),
            None => self.user_indexes.push(UserStakingHistoryIndexes {
                account_id,
                indexes: vec![index],
            }),
        }

        Ok(StakingHistory {
            index,
            staking_fact,
            timestamp,
            era_number,
        })
    }

    pub fn ensure_in_range(&self, index: u64) -> Result<()> {
        require!(
            index >= self.start_index && index < self.next_index,
            CustomErrorCode::IndexOutOfRange
        );
        Ok(())
    }

    pub fn indexes_of(&self, account_id: &Pubkey) -> Vec<u64> {
        self.user_indexes
            .iter()
            .find(|user| user.account_id == *account_id)
            .map(|user| user.indexes.clone())
            .unwrap_or_default()
    }
}
