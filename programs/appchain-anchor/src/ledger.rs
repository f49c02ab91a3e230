//! Validator and delegator stake records of the next era.
//!
//! Every successful mutation returns exactly one [`StakingFact`] describing it.
//! Lifecycle gating is the caller's job; this module only enforces the
//! protocol bounds.

use crate::error::CustomErrorCode;
use crate::history::StakingFact;
use crate::settings::ProtocolSettings;
use anchor_lang::prelude::*;
use std::collections::BTreeMap;

/// `0x` followed by 32 hex-encoded bytes.
pub const MAX_VALIDATOR_ID_IN_APPCHAIN_LEN: usize = 2 + 64;
pub const MAX_PROFILE_ENTRIES: usize = 16;
pub const MAX_PROFILE_KEY_LEN: usize = 32;
pub const MAX_PROFILE_VALUE_LEN: usize = 256;

/// Runtime template of the appchain, which fixes the shape of its account ids.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppchainTemplateType {
    /// Substrate-style chain with 32-byte account ids.
    Barnacle,
    /// EVM-compatible chain with 20-byte account ids.
    BarnacleEvm,
}

impl AppchainTemplateType {
    fn account_id_len(&self) -> usize {
        match self {
            AppchainTemplateType::Barnacle => 32,
            AppchainTemplateType::BarnacleEvm => 20,
        }
    }

    /// Normalizes `raw` to lowercase `0x`-prefixed hex and checks its length.
    pub fn normalize_account_id(&self, raw: &str) -> Result<String> {
        let raw = raw.trim().to_lowercase();
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        let bytes = hex::decode(digits).map_err(|_| CustomErrorCode::InvalidValidatorIdInAppchain)?;
        require!(
            bytes.len() == self.account_id_len(),
            CustomErrorCode::InvalidValidatorIdInAppchain
        );
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProfileEntry {
    pub key: String,
    pub value: String,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    pub validator_id: Pubkey,
    /// Bound at registration and never changed afterwards.
    pub validator_id_in_appchain: String,
    pub deposit_amount: u64,
    pub can_be_delegated_to: bool,
    pub profile: Vec<ProfileEntry>,
    pub registered_era: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Delegator {
    pub delegator_id: Pubkey,
    pub validator_id: Pubkey,
    pub deposit_amount: u64,
    /// Set when the validator unbonded; the delegation no longer counts and
    /// can only be unbonded.
    pub frozen: bool,
}

/// Validator view including the delegations it carries.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppchainValidator {
    pub validator_id: Pubkey,
    pub validator_id_in_appchain: String,
    pub deposit_amount: u64,
    pub total_stake: u128,
    pub delegators_count: u64,
    pub can_be_delegated_to: bool,
}

pub struct ValidatorRegistration {
    pub validator_id: Pubkey,
    pub validator_id_in_appchain: String,
    pub amount: u64,
    pub can_be_delegated_to: bool,
    pub profile: BTreeMap<String, String>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountLedger {
    validators: Vec<Validator>,
    delegators: Vec<Delegator>,
}

fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b)
        .ok_or_else(|| CustomErrorCode::AmountOverflow.into())
}

fn validate_profile(profile: &BTreeMap<String, String>) -> Result<Vec<ProfileEntry>> {
    require!(
        profile.len() <= MAX_PROFILE_ENTRIES,
        CustomErrorCode::InvalidValue
    );
    profile
        .iter()
        .map(|(key, value)| {
            require!(
                key.len() <= MAX_PROFILE_KEY_LEN && value.len() <= MAX_PROFILE_VALUE_LEN,
                CustomErrorCode::InvalidValue
            );
            Ok(ProfileEntry {
                key: key.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

impl AccountLedger {
    pub fn validator(&self, validator_id: &Pubkey) -> Option<&Validator> {
        self.validators
            .iter()
            .find(|v| v.validator_id == *validator_id)
    }

    fn validator_mut(&mut self, validator_id: &Pubkey) -> Result<&mut Validator> {
        self.validators
            .iter_mut()
            .find(|v| v.validator_id == *validator_id)
            .ok_or_else(|| CustomErrorCode::UnknownValidator.into())
    }

    pub fn delegator(&self, delegator_id: &Pubkey, validator_id: &Pubkey) -> Option<&Delegator> {
        self.delegators
            .iter()
            .find(|d| d.delegator_id == *delegator_id && d.validator_id == *validator_id)
    }

    fn live_delegator_mut(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
    ) -> Result<&mut Delegator> {
        require!(
            self.validator(validator_id).is_some(),
            CustomErrorCode::UnknownValidator
        );
        let delegator = self
            .delegators
            .iter_mut()
            .find(|d| d.delegator_id == *delegator_id && d.validator_id == *validator_id)
            .ok_or(CustomErrorCode::UnknownDelegator)?;
        require!(!delegator.frozen, CustomErrorCode::UnknownValidator);
        Ok(delegator)
    }

    pub fn register_validator(
        &mut self,
        settings: &ProtocolSettings,
        template: AppchainTemplateType,
        registration: ValidatorRegistration,
        era_number: u64,
    ) -> Result<StakingFact> {
        require!(
            registration.amount >= settings.minimum_validator_deposit,
            CustomErrorCode::BelowMinimumDeposit
        );
        require!(
            self.validator(&registration.validator_id).is_none(),
            CustomErrorCode::DuplicateValidator
        );
        let validator_id_in_appchain =
            template.normalize_account_id(&registration.validator_id_in_appchain)?;
        require!(
            !self
                .validators
                .iter()
                .any(|v| v.validator_id_in_appchain == validator_id_in_appchain),
            CustomErrorCode::DuplicateValidator
        );
        require!(
            self.validator_count() < settings.maximum_validator_count,
            CustomErrorCode::ValidatorCountExceeded
        );
        let profile = validate_profile(&registration.profile)?;

        self.validators.push(Validator {
            validator_id: registration.validator_id,
            validator_id_in_appchain: validator_id_in_appchain.clone(),
            deposit_amount: registration.amount,
            can_be_delegated_to: registration.can_be_delegated_to,
            profile,
            registered_era: era_number,
        });
        Ok(StakingFact::ValidatorRegistered {
            validator_id: registration.validator_id,
            validator_id_in_appchain,
            amount: registration.amount,
            can_be_delegated_to: registration.can_be_delegated_to,
        })
    }

    pub fn increase_stake(&mut self, validator_id: &Pubkey, amount: u64) -> Result<StakingFact> {
        require!(amount > 0, CustomErrorCode::InvalidAmount);
        let validator = self.validator_mut(validator_id)?;
        validator.deposit_amount = checked_add(validator.deposit_amount, amount)?;
        Ok(StakingFact::StakeIncreased {
            validator_id: *validator_id,
            amount,
        })
    }

    /// Full exit goes through [`AccountLedger::unbond_stake`]; a decrease must
    /// leave at least the minimum deposit behind.
    pub fn decrease_stake(
        &mut self,
        settings: &ProtocolSettings,
        validator_id: &Pubkey,
        amount: u64,
    ) -> Result<StakingFact> {
        require!(amount > 0, CustomErrorCode::InvalidAmount);
        let validator = self.validator_mut(validator_id)?;
        let remaining = validator
            .deposit_amount
            .checked_sub(amount)
            .ok_or(CustomErrorCode::InsufficientStake)?;
        require!(
            remaining >= settings.minimum_validator_deposit,
            CustomErrorCode::InsufficientStake
        );
        validator.deposit_amount = remaining;
        Ok(StakingFact::StakeDecreased {
            validator_id: *validator_id,
            amount,
        })
    }

    /// Removes the validator. Its delegations stay in place, frozen, until
    /// their owners unbond them.
    pub fn unbond_stake(&mut self, validator_id: &Pubkey) -> Result<StakingFact> {
        let position = self
            .validators
            .iter()
            .position(|v| v.validator_id == *validator_id)
            .ok_or(CustomErrorCode::UnknownValidator)?;
        let validator = self.validators.remove(position);
        self.delegators
            .iter_mut()
            .filter(|d| d.validator_id == *validator_id)
            .for_each(|d| d.frozen = true);
        Ok(StakingFact::ValidatorUnbonded {
            validator_id: *validator_id,
            amount: validator.deposit_amount,
        })
    }

    /// Replaces the profile of a registered validator.
    pub fn set_validator_profile(
        &mut self,
        validator_id: &Pubkey,
        profile: &BTreeMap<String, String>,
    ) -> Result<()> {
        let profile = validate_profile(profile)?;
        self.validator_mut(validator_id)?.profile = profile;
        Ok(())
    }

    pub fn validator_profile(&self, validator_id: &Pubkey) -> Result<Vec<ProfileEntry>> {
        self.validator(validator_id)
            .map(|v| v.profile.clone())
            .ok_or_else(|| CustomErrorCode::UnknownValidator.into())
    }

    pub fn set_delegation_enabled(
        &mut self,
        validator_id: &Pubkey,
        enabled: bool,
    ) -> Result<StakingFact> {
        let validator = self.validator_mut(validator_id)?;
        validator.can_be_delegated_to = enabled;
        Ok(match enabled {
            true => StakingFact::ValidatorDelegationEnabled {
                validator_id: *validator_id,
            },
            false => StakingFact::ValidatorDelegationDisabled {
                validator_id: *validator_id,
            },
        })
    }

    pub fn register_delegator(
        &mut self,
        settings: &ProtocolSettings,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
    ) -> Result<StakingFact> {
        let validator = self
            .validator(validator_id)
            .ok_or(CustomErrorCode::UnknownValidator)?;
        require!(
            self.delegator(delegator_id, validator_id).is_none(),
            CustomErrorCode::DuplicateDelegator
        );
        require!(
            validator.can_be_delegated_to,
            CustomErrorCode::ValidatorNotDelegable
        );
        require!(
            amount >= settings.minimum_delegator_deposit,
            CustomErrorCode::BelowMinimumDeposit
        );
        require!(
            self.validator_count_of(delegator_id) < settings.maximum_validators_per_delegator,
            CustomErrorCode::TooManyDelegations
        );

        self.delegators.push(Delegator {
            delegator_id: *delegator_id,
            validator_id: *validator_id,
            deposit_amount: amount,
            frozen: false,
        });
        Ok(StakingFact::DelegatorRegistered {
            delegator_id: *delegator_id,
            validator_id: *validator_id,
            amount,
        })
    }

    pub fn increase_delegation(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
    ) -> Result<StakingFact> {
        require!(amount > 0, CustomErrorCode::InvalidAmount);
        let delegator = self.live_delegator_mut(delegator_id, validator_id)?;
        delegator.deposit_amount = checked_add(delegator.deposit_amount, amount)?;
        Ok(StakingFact::DelegationIncreased {
            delegator_id: *delegator_id,
            validator_id: *validator_id,
            amount,
        })
    }

    pub fn decrease_delegation(
        &mut self,
        settings: &ProtocolSettings,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
        amount: u64,
    ) -> Result<StakingFact> {
        require!(amount > 0, CustomErrorCode::InvalidAmount);
        let delegator = self.live_delegator_mut(delegator_id, validator_id)?;
        let remaining = delegator
            .deposit_amount
            .checked_sub(amount)
            .ok_or(CustomErrorCode::InsufficientStake)?;
        require!(
            remaining >= settings.minimum_delegator_deposit,
            CustomErrorCode::InsufficientStake
        );
        delegator.deposit_amount = remaining;
        Ok(StakingFact::DelegationDecreased {
            delegator_id: *delegator_id,
            validator_id: *validator_id,
            amount,
        })
    }

    /// Works for frozen delegations too; it is their only way out.
    pub fn unbond_delegation(
        &mut self,
        delegator_id: &Pubkey,
        validator_id: &Pubkey,
    ) -> Result<StakingFact> {
        let position = self
            .delegators
            .iter()
            .position(|d| d.delegator_id == *delegator_id && d.validator_id == *validator_id)
            .ok_or(CustomErrorCode::UnknownDelegator)?;
        let delegator = self.delegators.remove(position);
        Ok(StakingFact::DelegatorUnbonded {
            delegator_id: *delegator_id,
            validator_id: *validator_id,
            amount: delegator.deposit_amount,
        })
    }

    pub fn validator_count(&self) -> u64 {
        self.validators.len() as u64
    }

    fn live_delegators(&self) -> impl Iterator<Item = &Delegator> {
        self.delegators.iter().filter(|d| !d.frozen)
    }

    pub fn delegator_count(&self) -> u64 {
        self.live_delegators().count() as u64
    }

    /// Distinct validators `delegator_id` currently delegates to.
    pub fn validator_count_of(&self, delegator_id: &Pubkey) -> u64 {
        self.live_delegators()
            .filter(|d| d.delegator_id == *delegator_id)
            .count() as u64
    }

    /// Sum of all live validator deposits and delegations.
    pub fn total_stake(&self) -> u128 {
        let validators: u128 = self
            .validators
            .iter()
            .map(|v| u128::from(v.deposit_amount))
            .sum();
        let delegations: u128 = self
            .live_delegators()
            .map(|d| u128::from(d.deposit_amount))
            .sum();
        validators + delegations
    }

    pub fn validator_list(&self) -> Vec<AppchainValidator> {
        self.validators
            .iter()
            .map(|validator| {
                let delegations = self
                    .live_delegators()
                    .filter(|d| d.validator_id == validator.validator_id);
                let (delegators_count, delegated) = delegations.fold((0u64, 0u128), |acc, d| {
                    (acc.0 + 1, acc.1 + u128::from(d.deposit_amount))
                });
                AppchainValidator {
                    validator_id: validator.validator_id,
                    validator_id_in_appchain: validator.validator_id_in_appchain.clone(),
                    deposit_amount: validator.deposit_amount,
                    total_stake: u128::from(validator.deposit_amount) + delegated,
                    delegators_count,
                    can_be_delegated_to: validator.can_be_delegated_to,
                }
            })
            .collect()
    }

    /// All delegation records bound to `validator_id`, frozen ones included.
    pub fn delegators_of(&self, validator_id: &Pubkey) -> Vec<Delegator> {
        self.delegators
            .iter()
            .filter(|d| d.validator_id == *validator_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_error;

    const APPCHAIN_ID: &str = "c425bbf59c7bf49e4fcc6547539d84ba8ecd2fb171f5b83cde3571d45d0c8224";

    fn settings() -> ProtocolSettings {
        ProtocolSettings {
            minimum_validator_deposit: 5_000,
            minimum_delegator_deposit: 200,
            maximum_validator_count: 3,
            maximum_validators_per_delegator: 2,
            ..ProtocolSettings::default()
        }
    }

    fn appchain_id(seed: u8) -> String {
        hex::encode([seed; 32])
    }

    fn registration(validator_id: Pubkey, amount: u64, seed: u8) -> ValidatorRegistration {
        ValidatorRegistration {
            validator_id,
            validator_id_in_appchain: appchain_id(seed),
            amount,
            can_be_delegated_to: true,
            profile: BTreeMap::new(),
        }
    }

    fn ledger_with_validator(validator_id: Pubkey) -> AccountLedger {
        let mut ledger = AccountLedger::default();
        ledger
            .register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(validator_id, 5_000, 1),
                0,
            )
            .unwrap();
        ledger
    }

    #[test]
    fn appchain_ids_are_normalized() {
        let template = AppchainTemplateType::Barnacle;
        let expected = format!("0x{}", APPCHAIN_ID);
        assert_eq!(template.normalize_account_id(APPCHAIN_ID).unwrap(), expected);
        assert_eq!(
            template
                .normalize_account_id(&format!("0X{}", APPCHAIN_ID.to_uppercase()))
                .unwrap(),
            expected
        );
        assert_error(
            template.normalize_account_id("0x1234"),
            CustomErrorCode::InvalidValidatorIdInAppchain,
        );
        assert_error(
            template.normalize_account_id("not hex at all"),
            CustomErrorCode::InvalidValidatorIdInAppchain,
        );
        assert!(AppchainTemplateType::BarnacleEvm
            .normalize_account_id(&hex::encode([7u8; 20]))
            .is_ok());
    }

    #[test]
    fn registration_deposit_boundary() {
        let mut ledger = AccountLedger::default();
        let validator = Pubkey::new_unique();
        assert_error(
            ledger.register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(validator, 4_999, 1),
                0,
            ),
            CustomErrorCode::BelowMinimumDeposit,
        );
        let fact = ledger
            .register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(validator, 5_000, 1),
                0,
            )
            .unwrap();
        assert_eq!(
            fact,
            StakingFact::ValidatorRegistered {
                validator_id: validator,
                validator_id_in_appchain: format!("0x{}", appchain_id(1)),
                amount: 5_000,
                can_be_delegated_to: true,
            }
        );
        assert_eq!(ledger.validator_count(), 1);
    }

    #[test]
    fn duplicate_validator_or_appchain_id_is_rejected() {
        let validator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        assert_error(
            ledger.register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(validator, 5_000, 2),
                0,
            ),
            CustomErrorCode::DuplicateValidator,
        );
        assert_error(
            ledger.register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(Pubkey::new_unique(), 5_000, 1),
                0,
            ),
            CustomErrorCode::DuplicateValidator,
        );
    }

    #[test]
    fn validator_count_is_capped() {
        let mut ledger = AccountLedger::default();
        for seed in 0..3 {
            ledger
                .register_validator(
                    &settings(),
                    AppchainTemplateType::Barnacle,
                    registration(Pubkey::new_unique(), 5_000, seed),
                    0,
                )
                .unwrap();
        }
        assert_error(
            ledger.register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(Pubkey::new_unique(), 5_000, 9),
                0,
            ),
            CustomErrorCode::ValidatorCountExceeded,
        );
    }

    #[test]
    fn oversized_profile_is_rejected() {
        let mut ledger = AccountLedger::default();
        let mut reg = registration(Pubkey::new_unique(), 5_000, 1);
        reg.profile
            .insert("email".to_string(), "x".repeat(MAX_PROFILE_VALUE_LEN + 1));
        assert_error(
            ledger.register_validator(&settings(), AppchainTemplateType::Barnacle, reg, 0),
            CustomErrorCode::InvalidValue,
        );
        assert_eq!(ledger.validator_count(), 0);
    }

    #[test]
    fn decrease_cannot_go_below_minimum_deposit() {
        let validator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        ledger.increase_stake(&validator, 50).unwrap();
        assert_error(
            ledger.decrease_stake(&settings(), &validator, 51),
            CustomErrorCode::InsufficientStake,
        );
        assert_error(
            ledger.decrease_stake(&settings(), &validator, 10_000),
            CustomErrorCode::InsufficientStake,
        );
        ledger.decrease_stake(&settings(), &validator, 50).unwrap();
        assert_eq!(ledger.validator(&validator).unwrap().deposit_amount, 5_000);
    }

    #[test]
    fn small_increases_are_accepted() {
        let validator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        ledger.increase_stake(&validator, 1).unwrap();
        assert_eq!(ledger.validator(&validator).unwrap().deposit_amount, 5_001);
        assert_error(
            ledger.increase_stake(&validator, 0),
            CustomErrorCode::InvalidAmount,
        );
        assert_error(
            ledger.increase_stake(&Pubkey::new_unique(), 100),
            CustomErrorCode::UnknownValidator,
        );
    }

    #[test]
    fn delegation_rules() {
        let validator = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);

        assert_error(
            ledger.register_delegator(&settings(), &delegator, &Pubkey::new_unique(), 500),
            CustomErrorCode::UnknownValidator,
        );
        assert_error(
            ledger.register_delegator(&settings(), &delegator, &validator, 199),
            CustomErrorCode::BelowMinimumDeposit,
        );
        ledger
            .register_delegator(&settings(), &delegator, &validator, 200)
            .unwrap();
        assert_error(
            ledger.register_delegator(&settings(), &delegator, &validator, 200),
            CustomErrorCode::DuplicateDelegator,
        );

        ledger.set_delegation_enabled(&validator, false).unwrap();
        assert_error(
            ledger.register_delegator(&settings(), &Pubkey::new_unique(), &validator, 500),
            CustomErrorCode::ValidatorNotDelegable,
        );
        assert_eq!(ledger.total_stake(), 5_200);
    }

    #[test]
    fn per_delegator_validator_cap() {
        let mut ledger = AccountLedger::default();
        let validators: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        for (seed, validator) in validators.iter().enumerate() {
            ledger
                .register_validator(
                    &settings(),
                    AppchainTemplateType::Barnacle,
                    registration(*validator, 5_000, seed as u8),
                    0,
                )
                .unwrap();
        }
        let delegator = Pubkey::new_unique();
        ledger
            .register_delegator(&settings(), &delegator, &validators[0], 200)
            .unwrap();
        ledger
            .register_delegator(&settings(), &delegator, &validators[1], 200)
            .unwrap();
        assert_error(
            ledger.register_delegator(&settings(), &delegator, &validators[2], 200),
            CustomErrorCode::TooManyDelegations,
        );
        // the cap is per delegator, other accounts are unaffected
        ledger
            .register_delegator(&settings(), &Pubkey::new_unique(), &validators[2], 200)
            .unwrap();
    }

    #[test]
    fn unbonding_validator_freezes_its_delegations() {
        let validator = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        ledger
            .register_delegator(&settings(), &delegator, &validator, 300)
            .unwrap();
        assert_eq!(ledger.total_stake(), 5_300);

        let fact = ledger.unbond_stake(&validator).unwrap();
        assert_eq!(
            fact,
            StakingFact::ValidatorUnbonded {
                validator_id: validator,
                amount: 5_000,
            }
        );
        assert_eq!(ledger.total_stake(), 0);
        assert_eq!(ledger.delegator_count(), 0);
        assert_eq!(ledger.validator_count_of(&delegator), 0);
        assert!(ledger.delegator(&delegator, &validator).unwrap().frozen);

        assert_error(
            ledger.increase_delegation(&delegator, &validator, 100),
            CustomErrorCode::UnknownValidator,
        );
        let fact = ledger.unbond_delegation(&delegator, &validator).unwrap();
        assert_eq!(
            fact,
            StakingFact::DelegatorUnbonded {
                delegator_id: delegator,
                validator_id: validator,
                amount: 300,
            }
        );
        assert!(ledger.delegators_of(&validator).is_empty());
    }

    #[test]
    fn re_registered_validator_does_not_revive_frozen_delegations() {
        let validator = Pubkey::new_unique();
        let delegator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        ledger
            .register_delegator(&settings(), &delegator, &validator, 300)
            .unwrap();
        ledger.unbond_stake(&validator).unwrap();
        ledger
            .register_validator(
                &settings(),
                AppchainTemplateType::Barnacle,
                registration(validator, 6_000, 1),
                1,
            )
            .unwrap();
        assert_eq!(ledger.total_stake(), 6_000);
        assert_error(
            ledger.decrease_delegation(&settings(), &delegator, &validator, 10),
            CustomErrorCode::UnknownValidator,
        );
    }

    #[test]
    fn validator_list_reports_delegated_stake() {
        let validator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        ledger
            .register_delegator(&settings(), &Pubkey::new_unique(), &validator, 200)
            .unwrap();
        ledger
            .register_delegator(&settings(), &Pubkey::new_unique(), &validator, 300)
            .unwrap();
        let list = ledger.validator_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].deposit_amount, 5_000);
        assert_eq!(list[0].total_stake, 5_500);
        assert_eq!(list[0].delegators_count, 2);
    }

    #[test]
    fn validator_profile_can_be_replaced() {
        let validator = Pubkey::new_unique();
        let mut ledger = ledger_with_validator(validator);
        assert!(ledger.validator_profile(&validator).unwrap().is_empty());

        let mut profile = BTreeMap::new();
        profile.insert("website".to_string(), "https://validator.example".to_string());
        profile.insert("email".to_string(), "ops@validator.example".to_string());
        ledger.set_validator_profile(&validator, &profile).unwrap();
        assert_eq!(
            ledger.validator_profile(&validator).unwrap(),
            vec![
                ProfileEntry {
                    key: "email".to_string(),
                    value: "ops@validator.example".to_string(),
                },
                ProfileEntry {
                    key: "website".to_string(),
                    value: "https://validator.example".to_string(),
                },
            ]
        );

        profile.insert("k".repeat(MAX_PROFILE_KEY_LEN + 1), "v".to_string());
        assert_error(
            ledger.set_validator_profile(&validator, &profile),
            CustomErrorCode::InvalidValue,
        );
        assert_eq!(ledger.validator_profile(&validator).unwrap().len(), 2);
        assert_error(
            ledger.set_validator_profile(&Pubkey::new_unique(), &BTreeMap::new()),
            CustomErrorCode::UnknownValidator,
        );
        assert_error(
            ledger.validator_profile(&Pubkey::new_unique()),
            CustomErrorCode::UnknownValidator,
        );
    }
}
