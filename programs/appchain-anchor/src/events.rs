use crate::history::StakingFact;
use crate::lifecycle::AppchainState;
use crate::settings::{AnchorSettingChange, AppchainSettingChange, ProtocolSettingChange};
use crate::tokens::WrappedAppchainTokenChange;
use anchor_lang::prelude::*;

#[event]
pub struct StakingFactRecorded {
    pub index: u64,
    pub account: Pubkey,
    pub staking_fact: StakingFact,
    pub era_number: u64,
    pub timestamp: i64,
}

#[event]
pub struct ValidatorProfileUpdated {
    pub validator_id: Pubkey,
    pub entry_count: u64,
}

#[event]
pub struct StakeWithdrawn {
    pub user: Pubkey,
    pub amount: u64,
    pub mint: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct ProtocolSettingsChanged {
    pub admin: Pubkey,
    pub changes: Vec<ProtocolSettingChange>,
}

#[event]
pub struct AppchainSettingsChanged {
    pub admin: Pubkey,
    pub changes: Vec<AppchainSettingChange>,
}

#[event]
pub struct AnchorSettingsChanged {
    pub admin: Pubkey,
    pub changes: Vec<AnchorSettingChange>,
}

#[event]
pub struct WrappedAppchainTokenChanged {
    pub admin: Pubkey,
    pub changes: Vec<WrappedAppchainTokenChange>,
}

#[event]
pub struct AppchainStateChanged {
    pub admin: Pubkey,
    pub old_state: AppchainState,
    pub new_state: AppchainState,
}

#[event]
pub struct EraSwitched {
    pub caller: Pubkey,
    pub era_number: u64,
}

#[event]
pub struct OwnerChanged {
    pub old_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct StakeTokenPriceUpdated {
    pub caller: Pubkey,
    pub old_price: u64,
    pub new_price: u64,
    pub mint: Pubkey,
}

#[event]
pub struct AssetTransferPauseChanged {
    pub admin: Pubkey,
    pub paused: bool,
}
