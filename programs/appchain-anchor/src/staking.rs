//! Staking actions on the anchor state.
//!
//! Each successful action records exactly one staking fact and returns the
//! history record the caller persists. Stake leaving the ledger is queued for
//! withdrawal after the matching unlock period.

use crate::error::CustomErrorCode;
use crate::history::{StakingFact, StakingHistory};
use crate::ledger::{ProfileEntry, ValidatorRegistration};
use crate::lifecycle::AppchainState;
use crate::state::AnchorState;
use crate::unbonding::UnbondedStakeEntry;
use anchor_lang::prelude::*;
use std::collections::BTreeMap;

impl AnchorState {
    fn record_fact(&mut self, staking_fact: StakingFact, now: i64) -> Result<StakingHistory> {
        self.staking_history
            .append(staking_fact, now, self.era_number)
    }

    /// Era at which stake unbonded now matures, saturating at `u64::MAX`.
    fn unlock_era_after(&self, unlock_period: u64) -> u64 {
        self.era_number.saturating_add(unlock_period)
    }

    fn record_unbonded(
        &mut self,
        account_id: &Pubkey,
        staking_fact: StakingFact,
        amount: u64,
        unlock_era: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        let record = self.record_fact(staking_fact, now)?;
        self.unbonding.push(
            account_id,
            UnbondedStakeEntry {
                amount,
                era_number: self.era_number,
                unlock_era,
                staking_history_index: record.index,
            },
        );
        Ok(record)
    }

    pub fn register_validator(
        &mut self,
        registration: ValidatorRegistration,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self.ledger.register_validator(
            &self.settings.protocol,
            self.appchain_template_type,
            registration,
            self.era_number,
        )?;
        self.record_fact(fact, now)
    }

    pub fn increase_stake(
        &mut self,
        validator_id: &Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self.ledger.increase_stake(validator_id, amount)?;
        self.record_fact(fact, now)
    }

    pub fn decrease_stake(
        &mut self,
        validator_id: &Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let unlock_era =
            self.unlock_era_after(self.settings.protocol.unlock_period_of_validator_deposit);
        let fact = self
            .ledger
            .decrease_stake(&self.settings.protocol, validator_id, amount)?;
        self.record_unbonded(validator_id, fact, amount, unlock_era, now)
    }

    pub fn unbond_stake(&mut self, validator_id: &Pubkey, now: i64) -> Result<StakingHistory> {
        self.appchain_state.ensure_unbonding_allowed()?;
        let amount = self
            .ledger
            .validator(validator_id)
            .map(|v| v.deposit_amount)
            .ok_or(CustomErrorCode::UnknownValidator)?;
        if self.appchain_state == AppchainState::Active {
            require!(
                self.ledger.validator_count() > self.settings.protocol.minimum_validator_count,
                CustomErrorCode::TooFewValidators
            );
        }
        let unlock_era =
            self.unlock_era_after(self.settings.protocol.unlock_period_of_validator_deposit);
        let fact = self.ledger.unbond_stake(validator_id)?;
        self.record_unbonded(validator_id, fact, amount, unlock_era, now)
    }

    pub fn enable_delegation(&mut self, validator_id: &Pubkey, now: i64) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self.ledger.set_delegation_enabled(validator_id, true)?;
        self.record_fact(fact, now)
    }

    pub fn disable_delegation(&mut self, validator_id: &Pubkey, now: i64) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self.ledger.set_delegation_enabled(validator_id, false)?;
        self.record_fact(fact, now)
    }

    pub fn register_delegator(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self.ledger.register_delegator(
            &self.settings.protocol,
            delegator_id,
            validator_id,
            amount,
        )?;
        self.record_fact(fact, now)
    }

    pub fn increase_delegation(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let fact = self
            .ledger
            .increase_delegation(delegator_id, validator_id, amount)?;
        self.record_fact(fact, now)
    }

    pub fn decrease_delegation(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_staking_allowed()?;
        let unlock_era =
            self.unlock_era_after(self.settings.protocol.unlock_period_of_delegator_deposit);
        let fact = self.ledger.decrease_delegation(
            &self.settings.protocol,
            delegator_id,
            validator_id,
            amount,
        )?;
        self.record_unbonded(delegator_id, fact, amount, unlock_era, now)
    }

    pub fn unbond_delegation(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        now: i64,
    ) -> Result<StakingHistory> {
        self.appchain_state.ensure_unbonding_allowed()?;
        let amount = self
            .ledger
            .delegator(delegator_id, validator_id)
            .map(|d| d.deposit_amount)
            .ok_or(CustomErrorCode::UnknownDelegator)?;
        let unlock_era =
            self.unlock_era_after(self.settings.protocol.unlock_period_of_delegator_deposit);
        let fact = self.ledger.unbond_delegation(delegator_id, validator_id)?;
        self.record_unbonded(delegator_id, fact, amount, unlock_era, now)
    }

    /// Profile updates are not staking facts and leave the history untouched.
    pub fn set_validator_profile(
        &mut self,
        validator_id: &Pubkey,
        entries: Vec<ProfileEntry>,
    ) -> Result<()> {
        let count = entries.len();
        let profile: BTreeMap<String, String> = entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();
        require!(profile.len() == count, CustomErrorCode::InvalidValue);
        self.ledger.set_validator_profile(validator_id, &profile)
    }

    /// Pays out every matured unbonded entry of `account_id` through `transfer`.
    /// Returns `0` without calling `transfer` when nothing has matured.
    pub fn withdraw_stake<F>(&mut self, account_id: &Pubkey, transfer: F) -> Result<u64>
    where
        F: FnOnce(u64) -> Result<()>,
    {
        require!(
            !self.asset_transfer_is_paused,
            CustomErrorCode::AssetTransferPaused
        );
        self.unbonding
            .withdraw_with(account_id, self.era_number, transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error, new_anchor_state, registration};

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn booting_freezes_stake_changes() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        state.appchain_state = AppchainState::Booting;

        assert_error(
            state.increase_stake(&validator, 100, NOW),
            CustomErrorCode::InvalidState,
        );
        assert_error(
            state.unbond_stake(&validator, NOW),
            CustomErrorCode::InvalidState,
        );
        assert_error(
            state.register_validator(registration(Pubkey::new_unique(), 5_000, 2), NOW),
            CustomErrorCode::InvalidState,
        );
        assert_eq!(state.staking_history.index_range().end_index, Some(0));
    }

    #[test]
    fn decrease_queues_the_decreased_amount() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 6_000, 1), NOW)
            .unwrap();
        let record = state.decrease_stake(&validator, 1_000, NOW).unwrap();
        let entries = state.unbonding.entries_of(&validator);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 1_000);
        assert_eq!(entries[0].staking_history_index, record.index);
        assert_eq!(
            entries[0].unlock_era,
            state.settings.protocol.unlock_period_of_validator_deposit
        );
    }

    #[test]
    fn active_anchor_keeps_minimum_validator_count() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        state.settings.protocol.minimum_validator_count = 2;
        let validators = [Pubkey::new_unique(), Pubkey::new_unique()];
        for (seed, validator) in validators.iter().enumerate() {
            state
                .register_validator(registration(*validator, 5_000, seed as u8), NOW)
                .unwrap();
        }
        state.appchain_state = AppchainState::Active;
        assert_error(
            state.unbond_stake(&validators[0], NOW),
            CustomErrorCode::TooFewValidators,
        );
        assert_error(
            state.unbond_stake(&Pubkey::new_unique(), NOW),
            CustomErrorCode::UnknownValidator,
        );

        state.appchain_state = AppchainState::Broken;
        state.unbond_stake(&validators[0], NOW).unwrap();
        assert_eq!(state.ledger.validator_count(), 1);
    }

    #[test]
    fn orphaned_delegation_unbonds_after_validator_leaves() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        state
            .register_delegator(&delegator, &validator, 500, NOW)
            .unwrap();
        state.unbond_stake(&validator, NOW).unwrap();
        assert_eq!(state.ledger.total_stake(), 0);

        let record = state.unbond_delegation(&delegator, &validator, NOW).unwrap();
        assert_eq!(record.index, 3);
        assert_eq!(state.unbonding.entries_of(&delegator)[0].amount, 500);
        assert_eq!(state.unbonding.entries_of(&validator)[0].amount, 5_000);
    }

    #[test]
    fn paused_transfers_block_withdrawal() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        state.unbond_stake(&validator, NOW).unwrap();
        state.era_number = state.settings.protocol.unlock_period_of_validator_deposit;
        state.asset_transfer_is_paused = true;
        assert_error(
            state.withdraw_stake(&validator, |_| Ok(())),
            CustomErrorCode::AssetTransferPaused,
        );
        state.asset_transfer_is_paused = false;
        assert_eq!(state.withdraw_stake(&validator, |_| Ok(())).unwrap(), 5_000);
    }

    #[test]
    fn delegation_toggle_is_recorded() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        let record = state.disable_delegation(&validator, NOW).unwrap();
        assert_eq!(
            record.staking_fact,
            StakingFact::ValidatorDelegationDisabled {
                validator_id: validator
            }
        );
        assert_error(
            state.register_delegator(&Pubkey::new_unique(), &validator, 500, NOW),
            CustomErrorCode::ValidatorNotDelegable,
        );
        state.enable_delegation(&validator, NOW).unwrap();
        state
            .register_delegator(&Pubkey::new_unique(), &validator, 500, NOW)
            .unwrap();
    }

    #[test]
    fn oversized_unlock_period_still_queues_the_exit() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        state.settings.protocol.unlock_period_of_validator_deposit = u64::MAX;
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        state.era_number = 1;

        let record = state.unbond_stake(&validator, NOW).unwrap();
        assert!(state.ledger.validator(&validator).is_none());
        assert_eq!(state.staking_history.index_range().end_index, Some(record.index));
        let entries = state.unbonding.entries_of(&validator);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 5_000);
        assert_eq!(entries[0].unlock_era, u64::MAX);
        assert_eq!(
            state
                .withdraw_stake(&validator, |_| panic!("entry is not mature"))
                .unwrap(),
            0
        );
    }

    #[test]
    fn rejected_exit_leaves_state_untouched() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 6_000, 1), NOW)
            .unwrap();
        state
            .register_delegator(&delegator, &validator, 500, NOW)
            .unwrap();
        let ledger = state.ledger.clone();
        let history = state.staking_history.clone();
        let unbonding = state.unbonding.clone();

        assert_error(
            state.decrease_stake(&validator, 1_001, NOW),
            CustomErrorCode::InsufficientStake,
        );
        assert_error(
            state.decrease_delegation(&delegator, &validator, 400, NOW),
            CustomErrorCode::InsufficientStake,
        );
        assert_error(
            state.unbond_delegation(&Pubkey::new_unique(), &validator, NOW),
            CustomErrorCode::UnknownDelegator,
        );
        state.settings.protocol.minimum_validator_count = 1;
        state.appchain_state = AppchainState::Active;
        assert_error(
            state.unbond_stake(&validator, NOW),
            CustomErrorCode::TooFewValidators,
        );

        assert_eq!(state.ledger, ledger);
        assert_eq!(state.staking_history, history);
        assert_eq!(state.unbonding, unbonding);
    }

    #[test]
    fn profile_update_rejects_repeated_keys() {
        let mut state = new_anchor_state(Pubkey::new_unique());
        let validator = Pubkey::new_unique();
        state
            .register_validator(registration(validator, 5_000, 1), NOW)
            .unwrap();
        let entry = |key: &str, value: &str| ProfileEntry {
            key: key.to_string(),
            value: value.to_string(),
        };

        assert_error(
            state.set_validator_profile(&validator, vec![entry("email", "a"), entry("email", "b")]),
            CustomErrorCode::InvalidValue,
        );
        state
            .set_validator_profile(&validator, vec![entry("email", "ops@validator.example")])
            .unwrap();
        assert_eq!(
            state.validator_profile(&validator).unwrap(),
            vec![entry("email", "ops@validator.example")]
        );
        assert_eq!(state.staking_history.index_range().end_index, Some(0));
    }
}
