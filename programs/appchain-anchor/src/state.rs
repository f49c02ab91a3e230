use crate::error::CustomErrorCode;
use crate::guard::AnchorRoles;
use crate::history::StakingHistoryLog;
use crate::ledger::{AccountLedger, AppchainTemplateType};
use crate::lifecycle::AppchainState;
use crate::settings::SettingsStore;
use crate::tokens::{StakeToken, WrappedAppchainToken};
use crate::unbonding::UnbondingQueue;
use anchor_lang::prelude::*;

pub const ANCHOR_STATE_SEED: &[u8] = b"anchor_state";
pub const STAKING_HISTORY_SEED: &[u8] = b"staking_history";
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

pub const MAX_APPCHAIN_ID_LEN: usize = 64;

#[account]
#[derive(Debug)]
pub struct AnchorState {
    pub owner: Pubkey,
    pub appchain_id: String,
    pub appchain_template_type: AppchainTemplateType,
    pub appchain_state: AppchainState,
    pub era_number: u64,
    pub stake_token: StakeToken,
    pub stake_vault: Pubkey,
    pub wrapped_appchain_token: WrappedAppchainToken,
    pub settings: SettingsStore,
    pub ledger: AccountLedger,
    pub staking_history: StakingHistoryLog,
    pub unbonding: UnbondingQueue,
    pub asset_transfer_is_paused: bool,
    pub bump: u8,
    pub vault_authority_bump: u8,
}

impl AnchorState {
    /// Space allocated at `initialize`, enough for the defaults.
    pub const INITIAL_SPACE: usize = 4 * 1024;
    /// Room a single instruction may grow the state by. Stays under the
    /// runtime's per-instruction realloc limit.
    pub const GROWTH_HEADROOM: usize = 8 * 1024;

    pub fn new(
        owner: Pubkey,
        appchain_id: String,
        appchain_template_type: AppchainTemplateType,
        stake_token: StakeToken,
        stake_vault: Pubkey,
        bump: u8,
        vault_authority_bump: u8,
    ) -> Result<Self> {
        require!(
            !appchain_id.trim().is_empty() && appchain_id.len() <= MAX_APPCHAIN_ID_LEN,
            CustomErrorCode::InvalidValue
        );
        Ok(Self {
            owner,
            appchain_id,
            appchain_template_type,
            appchain_state: AppchainState::Staging,
            era_number: 0,
            stake_token,
            stake_vault,
            wrapped_appchain_token: WrappedAppchainToken::default(),
            settings: SettingsStore::default(),
            ledger: AccountLedger::default(),
            staking_history: StakingHistoryLog::default(),
            unbonding: UnbondingQueue::default(),
            asset_transfer_is_paused: false,
            bump,
            vault_authority_bump,
        })
    }

    pub fn roles(&self) -> AnchorRoles {
        AnchorRoles {
            owner: self.owner,
            token_price_maintainer: self.settings.anchor.token_price_maintainer_account,
            relayer: self.settings.anchor.relayer_account,
        }
    }

    /// Account size needed to hold the current state plus one instruction's growth.
    pub fn required_space(&self) -> usize {
        let mut data = Vec::new();
        let used = self
            .serialize(&mut data)
            .map_or(Self::INITIAL_SPACE, |()| data.len());
        8 + used + Self::GROWTH_HEADROOM
    }
}
