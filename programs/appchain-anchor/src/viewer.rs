use crate::history::IndexRange;
use crate::ledger::{AppchainValidator, Delegator, ProfileEntry};
use crate::state::AnchorState;
use crate::unbonding::UnbondedStakeEntry;
use anchor_lang::prelude::*;

/// Snapshot of the next era, computed from the ledger at read time.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnchorStatus {
    pub total_stake_in_next_era: u128,
    pub validator_count_in_next_era: u64,
    pub delegator_count_in_next_era: u64,
    pub index_range_of_staking_history: IndexRange,
    pub era_number: u64,
    pub asset_transfer_is_paused: bool,
}

impl AnchorState {
    pub fn anchor_status(&self) -> AnchorStatus {
        AnchorStatus {
            total_stake_in_next_era: self.ledger.total_stake(),
            validator_count_in_next_era: self.ledger.validator_count(),
            delegator_count_in_next_era: self.ledger.delegator_count(),
            index_range_of_staking_history: self.staking_history.index_range(),
            era_number: self.era_number,
            asset_transfer_is_paused: self.asset_transfer_is_paused,
        }
    }

    pub fn validator_list(&self) -> Vec<AppchainValidator> {
        self.ledger.validator_list()
    }

    pub fn validator_profile(&self, validator_id: &Pubkey) -> Result<Vec<ProfileEntry>> {
        self.ledger.validator_profile(validator_id)
    }

    pub fn delegators_of(&self, validator_id: &Pubkey) -> Vec<Delegator> {
        self.ledger.delegators_of(validator_id)
    }

    pub fn unbonded_stakes_of(&self, account_id: &Pubkey) -> Vec<UnbondedStakeEntry> {
        self.unbonding.entries_of(account_id)
    }

    pub fn user_staking_history_indexes(&self, account_id: &Pubkey) -> Vec<u64> {
        self.staking_history.indexes_of(account_id)
    }
}
