pub mod account_structs;
/// # appchain anchor - Appchain Validator Staking
///
/// ## Business Process Flow
///
/// 1. Initial Setup:
///    - Upgrade authority initializes the anchor with the appchain id, the
///      appchain template type and the stake token vault
///    - The vault is handed to the vault_authority PDA
///    - Owner tunes protocol, appchain and anchor settings
///
/// 2. Staging:
///    a. Validators deposit stake tokens with a `RegisterValidator` intent
///    b. Delegators deposit stake tokens with a `RegisterDelegator` intent
///    c. Every accepted action is recorded as a staking fact under the next
///       history index
///
/// 3. Lifecycle:
///    - `go_booting` once enough validators bonded enough stake value
///    - `go_live` once the wrapped appchain token is configured
///    - `go_broken` stops the appchain; only exits remain possible
///
/// 4. Exit Flow:
///    a. Unbonding:
///       - Validators and delegators decrease or unbond their stake
///       - The amount is queued until its unlock era
///    b. Withdrawal:
///       - Eras are advanced by the owner or the relayer
///       - Matured amounts are transferred back from the vault
///
/// All staking state lives in one PDA that is reallocated on every write;
/// staking facts live in one PDA per history index.
pub mod error;
pub mod events;
pub mod governance;
pub mod guard;
pub mod history;
pub mod intake;
pub mod ledger;
pub mod lifecycle;
pub mod processor;
pub mod settings;
pub mod staking;
pub mod state;
pub mod tokens;
pub mod unbonding;
pub mod viewer;

use account_structs::*;
use anchor_lang::prelude::*;
use history::{IndexRange, StakingHistory};
use ledger::{AppchainTemplateType, AppchainValidator, Delegator, ProfileEntry};
use lifecycle::AppchainState;
use settings::{
    AnchorSettingChange, AnchorSettings, AppchainSettingChange, AppchainSettings,
    ProtocolSettingChange, ProtocolSettings,
};
use tokens::{StakeToken, WrappedAppchainToken, WrappedAppchainTokenChange};
use unbonding::UnbondedStakeEntry;
use viewer::AnchorStatus;

declare_id!("CpUkUNZUvbSvbnK917HsMQVxbE11QGTewYTuC2h89Lr5");

#[program]
pub mod appchain_anchor {
    use super::*;

    /// Creates the anchor state:
    /// - appchain_id: Identifier of the appchain this anchor serves
    /// - appchain_template_type: Decides the shape of validator ids in the appchain
    pub fn initialize(
        ctx: Context<Initialize>,
        appchain_id: String,
        appchain_template_type: AppchainTemplateType,
    ) -> Result<()> {
        processor::initialize(ctx, appchain_id, appchain_template_type)
    }

    /// Applies the changes in order; either all of them take effect or none.
    pub fn change_protocol_settings(
        ctx: Context<ManageAnchor>,
        changes: Vec<ProtocolSettingChange>,
    ) -> Result<()> {
        processor::change_protocol_settings(ctx, changes)
    }

    pub fn change_appchain_settings(
        ctx: Context<ManageAnchor>,
        changes: Vec<AppchainSettingChange>,
    ) -> Result<()> {
        processor::change_appchain_settings(ctx, changes)
    }

    pub fn change_anchor_settings(
        ctx: Context<ManageAnchor>,
        changes: Vec<AnchorSettingChange>,
    ) -> Result<()> {
        processor::change_anchor_settings(ctx, changes)
    }

    pub fn change_wrapped_appchain_token(
        ctx: Context<ManageAnchor>,
        changes: Vec<WrappedAppchainTokenChange>,
    ) -> Result<()> {
        processor::change_wrapped_appchain_token(ctx, changes)
    }

    pub fn go_booting(ctx: Context<ManageAnchor>) -> Result<()> {
        processor::go_booting(ctx)
    }

    pub fn go_live(ctx: Context<ManageAnchor>) -> Result<()> {
        processor::go_live(ctx)
    }

    pub fn go_broken(ctx: Context<ManageAnchor>) -> Result<()> {
        processor::go_broken(ctx)
    }

    pub fn set_owner(ctx: Context<ManageAnchor>, new_owner: Pubkey) -> Result<()> {
        processor::set_owner(ctx, new_owner)
    }

    /// Callable by the owner or the token price maintainer.
    pub fn set_price_of_stake_token(ctx: Context<ManageAnchor>, price_in_usd: u64) -> Result<()> {
        processor::set_price_of_stake_token(ctx, price_in_usd)
    }

    /// Callable by the owner or the relayer.
    pub fn switch_era(ctx: Context<ManageAnchor>) -> Result<()> {
        processor::switch_era(ctx)
    }

    pub fn pause_asset_transfer(ctx: Context<ManageAnchor>, paused: bool) -> Result<()> {
        processor::pause_asset_transfer(ctx, paused)
    }

    /// Transfers `amount` stake tokens into the vault and applies the staking
    /// intent in `msg`:
    /// - `{"RegisterValidator":{"validator_id_in_appchain":..,"can_be_delegated_to":..,"profile":{..}}}`
    /// - `"IncreaseStake"`
    /// - `{"RegisterDelegator":{"validator_id":..}}`
    /// - `{"IncreaseDelegation":{"validator_id":..}}`
    ///
    /// A rejected intent fails the transaction, which reverts the transfer.
    pub fn deposit_stake(ctx: Context<DepositStake>, amount: u64, msg: String) -> Result<()> {
        processor::deposit_stake(ctx, amount, msg)
    }

    pub fn decrease_stake(ctx: Context<StakingAction>, amount: u64) -> Result<()> {
        processor::decrease_stake(ctx, amount)
    }

    pub fn unbond_stake(ctx: Context<StakingAction>) -> Result<()> {
        processor::unbond_stake(ctx)
    }

    pub fn enable_delegation(ctx: Context<StakingAction>) -> Result<()> {
        processor::enable_delegation(ctx)
    }

    pub fn disable_delegation(ctx: Context<StakingAction>) -> Result<()> {
        processor::disable_delegation(ctx)
    }

    pub fn decrease_delegation(
        ctx: Context<StakingAction>,
        validator_id: Pubkey,
        amount: u64,
    ) -> Result<()> {
        processor::decrease_delegation(ctx, validator_id, amount)
    }

    pub fn unbond_delegation(ctx: Context<StakingAction>, validator_id: Pubkey) -> Result<()> {
        processor::unbond_delegation(ctx, validator_id)
    }

    /// Replaces the signer's validator profile. Keys must be unique.
    pub fn set_validator_profile(
        ctx: Context<UpdateValidatorProfile>,
        profile: Vec<ProfileEntry>,
    ) -> Result<()> {
        processor::set_validator_profile(ctx, profile)
    }

    /// Transfers every matured unbonded entry of the signer back from the vault.
    /// Does nothing when no entry has matured.
    pub fn withdraw_stake(ctx: Context<WithdrawStake>) -> Result<()> {
        processor::withdraw_stake(ctx)
    }

    pub fn get_owner(ctx: Context<ViewAnchor>) -> Result<Pubkey> {
        processor::get_owner(ctx)
    }

    pub fn get_protocol_settings(ctx: Context<ViewAnchor>) -> Result<ProtocolSettings> {
        processor::get_protocol_settings(ctx)
    }

    pub fn get_appchain_settings(ctx: Context<ViewAnchor>) -> Result<AppchainSettings> {
        processor::get_appchain_settings(ctx)
    }

    pub fn get_anchor_settings(ctx: Context<ViewAnchor>) -> Result<AnchorSettings> {
        processor::get_anchor_settings(ctx)
    }

    pub fn get_appchain_state(ctx: Context<ViewAnchor>) -> Result<AppchainState> {
        processor::get_appchain_state(ctx)
    }

    pub fn get_anchor_status(ctx: Context<ViewAnchor>) -> Result<AnchorStatus> {
        processor::get_anchor_status(ctx)
    }

    pub fn get_stake_token(ctx: Context<ViewAnchor>) -> Result<StakeToken> {
        processor::get_stake_token(ctx)
    }

    pub fn get_wrapped_appchain_token(ctx: Context<ViewAnchor>) -> Result<WrappedAppchainToken> {
        processor::get_wrapped_appchain_token(ctx)
    }

    pub fn get_index_range_of_staking_history(ctx: Context<ViewAnchor>) -> Result<IndexRange> {
        processor::get_index_range_of_staking_history(ctx)
    }

    /// Fails with `IndexOutOfRange` outside the current index range.
    pub fn get_staking_history(
        ctx: Context<ViewStakingHistory>,
        index: u64,
    ) -> Result<StakingHistory> {
        processor::get_staking_history(ctx, index)
    }

    pub fn get_user_staking_history_indexes(
        ctx: Context<ViewAnchor>,
        account_id: Pubkey,
    ) -> Result<Vec<u64>> {
        processor::get_user_staking_history_indexes(ctx, account_id)
    }

    pub fn get_unbonded_stakes_of(
        ctx: Context<ViewAnchor>,
        account_id: Pubkey,
    ) -> Result<Vec<UnbondedStakeEntry>> {
        processor::get_unbonded_stakes_of(ctx, account_id)
    }

    pub fn get_validator_list(ctx: Context<ViewAnchor>) -> Result<Vec<AppchainValidator>> {
        processor::get_validator_list(ctx)
    }

    pub fn get_validator_profile(
        ctx: Context<ViewAnchor>,
        validator_id: Pubkey,
    ) -> Result<Vec<ProfileEntry>> {
        processor::get_validator_profile(ctx, validator_id)
    }

    pub fn get_delegators_of(
        ctx: Context<ViewAnchor>,
        validator_id: Pubkey,
    ) -> Result<Vec<Delegator>> {
        processor::get_delegators_of(ctx, validator_id)
    }
}
