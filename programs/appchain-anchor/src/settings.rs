//! Governance-mutable configuration of the anchor.
//!
//! Settings are grouped in three snapshots (protocol, appchain, anchor). Each
//! change is a single-field command; a batch of commands is applied in order
//! and committed only if every command in it is valid.

use crate::error::CustomErrorCode;
use crate::guard::{require_capability, Authorizer, Capability};
use anchor_lang::prelude::*;

/// Upper bound for any string-valued appchain setting.
pub const MAX_SETTING_STRING_LEN: usize = 1024;
pub const MAX_PERCENT: u16 = 100;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProtocolSettings {
    /// Deposit a validator has to bond to be registered.
    pub minimum_validator_deposit: u64,
    /// Largest share (percent) of total stake a single validator may hold.
    pub maximum_validator_stake_percent: u16,
    /// Deposit a delegator has to bond to delegate to a validator.
    pub minimum_delegator_deposit: u64,
    /// Minimum market value (in USD units) of total stake for booting the appchain.
    pub minimum_total_stake_price_for_booting: u64,
    /// Cap on the market value of bridged tokens, as percent of total stake value.
    pub maximum_market_value_percent_of_bridged_tokens: u16,
    /// Cap on the market value of the wrapped appchain token, as percent of total stake value.
    pub maximum_market_value_percent_of_wrapped_appchain_token: u16,
    /// Validators needed to boot the appchain and keep it alive.
    pub minimum_validator_count: u64,
    pub maximum_validator_count: u64,
    /// Distinct validators a single delegator may delegate to.
    pub maximum_validators_per_delegator: u64,
    /// Unlock period (in eras) of unbonded validator deposits.
    pub unlock_period_of_validator_deposit: u64,
    /// Unlock period (in eras) of unbonded delegator deposits.
    pub unlock_period_of_delegator_deposit: u64,
    pub maximum_era_count_of_unwithdrawn_reward: u64,
    pub maximum_era_count_of_valid_appchain_message: u64,
    /// Share (percent) of a delegator's reward kept by its validator.
    pub delegation_fee_percent: u16,
    pub maximum_allowed_unprofitable_era_count: u16,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            minimum_validator_deposit: 5_000,
            maximum_validator_stake_percent: 25,
            minimum_delegator_deposit: 200,
            minimum_total_stake_price_for_booting: 100_000,
            maximum_market_value_percent_of_bridged_tokens: 33,
            maximum_market_value_percent_of_wrapped_appchain_token: 67,
            minimum_validator_count: 4,
            maximum_validator_count: 60,
            maximum_validators_per_delegator: 16,
            unlock_period_of_validator_deposit: 21,
            unlock_period_of_delegator_deposit: 21,
            maximum_era_count_of_unwithdrawn_reward: 84,
            maximum_era_count_of_valid_appchain_message: 7,
            delegation_fee_percent: 20,
            maximum_allowed_unprofitable_era_count: 3,
        }
    }
}

/// Single-field command against [`ProtocolSettings`].
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum ProtocolSettingChange {
    MinimumValidatorDeposit(u64),
    MaximumValidatorStakePercent(u16),
    MinimumDelegatorDeposit(u64),
    MinimumTotalStakePriceForBooting(u64),
    MaximumMarketValuePercentOfBridgedTokens(u16),
    MaximumMarketValuePercentOfWrappedAppchainToken(u16),
    MinimumValidatorCount(u64),
    MaximumValidatorCount(u64),
    MaximumValidatorsPerDelegator(u64),
    UnlockPeriodOfValidatorDeposit(u64),
    UnlockPeriodOfDelegatorDeposit(u64),
    MaximumEraCountOfUnwithdrawnReward(u64),
    MaximumEraCountOfValidAppchainMessage(u64),
    DelegationFeePercent(u16),
    MaximumAllowedUnprofitableEraCount(u16),
}

impl ProtocolSettings {
    pub fn apply(&mut self, change: &ProtocolSettingChange) -> Result<()> {
        let mut next = self.clone();
        match *change {
            ProtocolSettingChange::MinimumValidatorDeposit(v) => next.minimum_validator_deposit = v,
            ProtocolSettingChange::MaximumValidatorStakePercent(v) => {
                next.maximum_validator_stake_percent = v
            }
            ProtocolSettingChange::MinimumDelegatorDeposit(v) => next.minimum_delegator_deposit = v,
            ProtocolSettingChange::MinimumTotalStakePriceForBooting(v) => {
                next.minimum_total_stake_price_for_booting = v
            }
            ProtocolSettingChange::MaximumMarketValuePercentOfBridgedTokens(v) => {
                next.maximum_market_value_percent_of_bridged_tokens = v
            }
            ProtocolSettingChange::MaximumMarketValuePercentOfWrappedAppchainToken(v) => {
                next.maximum_market_value_percent_of_wrapped_appchain_token = v
            }
            ProtocolSettingChange::MinimumValidatorCount(v) => next.minimum_validator_count = v,
            ProtocolSettingChange::MaximumValidatorCount(v) => next.maximum_validator_count = v,
            ProtocolSettingChange::MaximumValidatorsPerDelegator(v) => {
                next.maximum_validators_per_delegator = v
            }
            ProtocolSettingChange::UnlockPeriodOfValidatorDeposit(v) => {
                next.unlock_period_of_validator_deposit = v
            }
            ProtocolSettingChange::UnlockPeriodOfDelegatorDeposit(v) => {
                next.unlock_period_of_delegator_deposit = v
            }
            ProtocolSettingChange::MaximumEraCountOfUnwithdrawnReward(v) => {
                next.maximum_era_count_of_unwithdrawn_reward = v
            }
            ProtocolSettingChange::MaximumEraCountOfValidAppchainMessage(v) => {
                next.maximum_era_count_of_valid_appchain_message = v
            }
            ProtocolSettingChange::DelegationFeePercent(v) => next.delegation_fee_percent = v,
            ProtocolSettingChange::MaximumAllowedUnprofitableEraCount(v) => {
                next.maximum_allowed_unprofitable_era_count = v
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        require!(
            self.minimum_validator_count <= self.maximum_validator_count,
            CustomErrorCode::InvalidValue
        );
        for percent in [
            self.maximum_validator_stake_percent,
            self.maximum_market_value_percent_of_bridged_tokens,
            self.maximum_market_value_percent_of_wrapped_appchain_token,
            self.delegation_fee_percent,
        ] {
            require!(percent <= MAX_PERCENT, CustomErrorCode::InvalidValue);
        }
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppchainSettings {
    pub chain_spec: String,
    pub raw_chain_spec: String,
    pub boot_nodes: String,
    pub rpc_endpoint: String,
    pub subql_endpoint: String,
    /// Reward issued by the appchain per era, in wrapped appchain token units.
    pub era_reward: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum AppchainSettingChange {
    ChainSpec(String),
    RawChainSpec(String),
    BootNodes(String),
    RpcEndpoint(String),
    SubqlEndpoint(String),
    EraReward(u64),
}

impl AppchainSettings {
    pub fn apply(&mut self, change: &AppchainSettingChange) -> Result<()> {
        let (field, value) = match change {
            AppchainSettingChange::ChainSpec(v) => (&mut self.chain_spec, v),
            AppchainSettingChange::RawChainSpec(v) => (&mut self.raw_chain_spec, v),
            AppchainSettingChange::BootNodes(v) => (&mut self.boot_nodes, v),
            AppchainSettingChange::RpcEndpoint(v) => (&mut self.rpc_endpoint, v),
            AppchainSettingChange::SubqlEndpoint(v) => (&mut self.subql_endpoint, v),
            AppchainSettingChange::EraReward(v) => {
                self.era_reward = *v;
                return Ok(());
            }
        };
        require!(
            value.len() <= MAX_SETTING_STRING_LEN,
            CustomErrorCode::InvalidValue
        );
        field.clone_from(value);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnchorSettings {
    /// Account allowed to update the stake token price besides the owner.
    pub token_price_maintainer_account: Option<Pubkey>,
    /// Account allowed to switch eras besides the owner.
    pub relayer_account: Option<Pubkey>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum AnchorSettingChange {
    TokenPriceMaintainerAccount(Option<Pubkey>),
    RelayerAccount(Option<Pubkey>),
}

impl AnchorSettings {
    pub fn apply(&mut self, change: &AnchorSettingChange) {
        match *change {
            AnchorSettingChange::TokenPriceMaintainerAccount(account) => {
                self.token_price_maintainer_account = account
            }
            AnchorSettingChange::RelayerAccount(account) => self.relayer_account = account,
        }
    }
}

/// The three settings groups, mutated only through governance.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsStore {
    pub protocol: ProtocolSettings,
    pub appchain: AppchainSettings,
    pub anchor: AnchorSettings,
}

impl SettingsStore {
    pub fn change_protocol_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[ProtocolSettingChange],
    ) -> Result<()> {
        require_capability(authorizer, caller, Capability::Governance)?;
        let mut next = self.protocol.clone();
        for change in changes {
            next.apply(change)?;
        }
        self.protocol = next;
        Ok(())
    }

    pub fn change_appchain_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[AppchainSettingChange],
    ) -> Result<()> {
        require_capability(authorizer, caller, Capability::Governance)?;
        let mut next = self.appchain.clone();
        for change in changes {
            next.apply(change)?;
        }
        self.appchain = next;
        Ok(())
    }

    pub fn change_anchor_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[AnchorSettingChange],
    ) -> Result<()> {
        require_capability(authorizer, caller, Capability::Governance)?;
        for change in changes {
            self.anchor.apply(change);
        }
        Ok(())
    }
}
