use crate::account_structs::*;
use crate::error::*;
use crate::events::*;
use crate::guard::validate_program_update_authority;
use crate::history::{IndexRange, StakingHistory};
use crate::ledger::{AppchainTemplateType, AppchainValidator, Delegator, ProfileEntry};
use crate::lifecycle::AppchainState;
use crate::settings::{
    AnchorSettingChange, AnchorSettings, AppchainSettingChange, AppchainSettings,
    ProtocolSettingChange, ProtocolSettings,
};
use crate::state::{AnchorState, VAULT_AUTHORITY_SEED};
use crate::tokens::{StakeToken, WrappedAppchainToken, WrappedAppchainTokenChange};
use crate::unbonding::UnbondedStakeEntry;
use crate::viewer::AnchorStatus;
use anchor_lang::prelude::*;
use anchor_spl::token::spl_token::instruction::AuthorityType;
use anchor_spl::token::{self, Transfer};

pub fn initialize(
    ctx: Context<Initialize>,
    appchain_id: String,
    appchain_template_type: AppchainTemplateType,
) -> Result<()> {
    validate_program_update_authority(&ctx.accounts.program_data, &ctx.accounts.signer)?;

    let stake_token = StakeToken {
        mint: ctx.accounts.stake_mint.key(),
        decimals: ctx.accounts.stake_mint.decimals,
        price_in_usd: 0,
    };
    let anchor_state = AnchorState::new(
        ctx.accounts.signer.key(),
        appchain_id,
        appchain_template_type,
        stake_token,
        ctx.accounts.stake_vault.key(),
        ctx.bumps.anchor_state,
        ctx.bumps.vault_authority,
    )?;
    msg!(
        "Anchor initialized for appchain {} with owner {}",
        anchor_state.appchain_id,
        anchor_state.owner
    );
    ctx.accounts.anchor_state.set_inner(anchor_state);

    // Hand the stake vault over to the vault authority PDA unless it already owns it.
    if ctx.accounts.stake_vault.owner == ctx.accounts.signer.key() {
        token::set_authority(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                token::SetAuthority {
                    account_or_mint: ctx.accounts.stake_vault.to_account_info(),
                    current_authority: ctx.accounts.signer.to_account_info(),
                },
            ),
            AuthorityType::AccountOwner,
            Some(ctx.accounts.vault_authority.key()),
        )?;
    }
    Ok(())
}

pub fn change_protocol_settings(
    ctx: Context<ManageAnchor>,
    changes: Vec<ProtocolSettingChange>,
) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    anchor_state.change_protocol_settings(&roles, &admin, &changes)?;

    msg!("Protocol settings changed: {} field(s)", changes.len());
    emit!(ProtocolSettingsChanged { admin, changes });
    Ok(())
}

pub fn change_appchain_settings(
    ctx: Context<ManageAnchor>,
    changes: Vec<AppchainSettingChange>,
) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    anchor_state.change_appchain_settings(&roles, &admin, &changes)?;

    msg!("Appchain settings changed: {} field(s)", changes.len());
    emit!(AppchainSettingsChanged { admin, changes });
    Ok(())
}

pub fn change_anchor_settings(
    ctx: Context<ManageAnchor>,
    changes: Vec<AnchorSettingChange>,
) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    anchor_state.change_anchor_settings(&roles, &admin, &changes)?;

    msg!("Anchor settings changed: {} field(s)", changes.len());
    emit!(AnchorSettingsChanged { admin, changes });
    Ok(())
}

pub fn change_wrapped_appchain_token(
    ctx: Context<ManageAnchor>,
    changes: Vec<WrappedAppchainTokenChange>,
) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    anchor_state.change_wrapped_appchain_token(&roles, &admin, &changes)?;

    msg!("Wrapped appchain token changed: {} field(s)", changes.len());
    emit!(WrappedAppchainTokenChanged { admin, changes });
    Ok(())
}

fn transition(
    ctx: Context<ManageAnchor>,
    apply: impl FnOnce(&mut AnchorState, &Pubkey) -> Result<AppchainState>,
) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let old_state = anchor_state.appchain_state;
    let new_state = apply(&mut **anchor_state, &admin)?;

    msg!("Appchain state: {:?} -> {:?}", old_state, new_state);
    emit!(AppchainStateChanged {
        admin,
        old_state,
        new_state,
    });
    Ok(())
}

pub fn go_booting(ctx: Context<ManageAnchor>) -> Result<()> {
    transition(ctx, |anchor_state, admin| {
        let roles = anchor_state.roles();
        anchor_state.go_booting(&roles, admin)
    })
}

pub fn go_live(ctx: Context<ManageAnchor>) -> Result<()> {
    transition(ctx, |anchor_state, admin| {
        let roles = anchor_state.roles();
        anchor_state.go_live(&roles, admin)
    })
}

pub fn go_broken(ctx: Context<ManageAnchor>) -> Result<()> {
    transition(ctx, |anchor_state, admin| {
        let roles = anchor_state.roles();
        anchor_state.go_broken(&roles, admin)
    })
}

pub fn set_owner(ctx: Context<ManageAnchor>, new_owner: Pubkey) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    let old_owner = anchor_state.set_owner(&roles, &admin, new_owner)?;

    msg!("Owner changed from {} to {}", old_owner, new_owner);
    emit!(OwnerChanged {
        old_owner,
        new_owner,
    });
    Ok(())
}

pub fn set_price_of_stake_token(ctx: Context<ManageAnchor>, price_in_usd: u64) -> Result<()> {
    let caller = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    let old_price = anchor_state.set_price_of_stake_token(&roles, &caller, price_in_usd)?;

    emit!(StakeTokenPriceUpdated {
        caller,
        old_price,
        new_price: price_in_usd,
        mint: anchor_state.stake_token.mint,
    });
    Ok(())
}

pub fn switch_era(ctx: Context<ManageAnchor>) -> Result<()> {
    let caller = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    let era_number = anchor_state.switch_era(&roles, &caller)?;

    msg!("Switched to era {}", era_number);
    emit!(EraSwitched { caller, era_number });
    Ok(())
}

pub fn pause_asset_transfer(ctx: Context<ManageAnchor>, paused: bool) -> Result<()> {
    let admin = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let roles = anchor_state.roles();
    anchor_state.pause_asset_transfer(&roles, &admin, paused)?;

    msg!("Asset transfer paused: {}", paused);
    emit!(AssetTransferPauseChanged { admin, paused });
    Ok(())
}

/// Stores `record` in the history account derived for `expected_index`.
fn persist_staking_history(
    staking_history: &mut Account<StakingHistory>,
    expected_index: u64,
    record: StakingHistory,
) -> Result<()> {
    require!(
        record.index == expected_index,
        CustomErrorCode::IndexOutOfRange
    );
    msg!("Staking fact recorded at index {}", record.index);
    emit!(StakingFactRecorded {
        index: record.index,
        account: record.staking_fact.account_id(),
        staking_fact: record.staking_fact.clone(),
        era_number: record.era_number,
        timestamp: record.timestamp,
    });
    staking_history.set_inner(record);
    Ok(())
}

pub fn deposit_stake(ctx: Context<DepositStake>, amount: u64, msg: String) -> Result<()> {
    require!(amount > 0, CustomErrorCode::InvalidAmount);

    let cpi_accounts = Transfer {
        from: ctx.accounts.user_token_account.to_account_info(),
        to: ctx.accounts.stake_vault.to_account_info(),
        authority: ctx.accounts.signer.to_account_info(),
    };
    token::transfer(
        CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts),
        amount,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let sender = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let expected_index = anchor_state.staking_history.next_index();
    let record = anchor_state.process_stake_deposit(&sender, amount, &msg, now)?;
    persist_staking_history(&mut ctx.accounts.staking_history, expected_index, record)
}

fn staking_action(
    ctx: Context<StakingAction>,
    apply: impl FnOnce(&mut AnchorState, &Pubkey, i64) -> Result<StakingHistory>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.signer.key();
    let anchor_state = &mut ctx.accounts.anchor_state;
    let expected_index = anchor_state.staking_history.next_index();
    let record = apply(&mut **anchor_state, &caller, now)?;
    persist_staking_history(&mut ctx.accounts.staking_history, expected_index, record)
}

pub fn decrease_stake(ctx: Context<StakingAction>, amount: u64) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.decrease_stake(caller, amount, now)
    })
}

pub fn unbond_stake(ctx: Context<StakingAction>) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.unbond_stake(caller, now)
    })
}

pub fn enable_delegation(ctx: Context<StakingAction>) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.enable_delegation(caller, now)
    })
}

pub fn disable_delegation(ctx: Context<StakingAction>) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.disable_delegation(caller, now)
    })
}

pub fn decrease_delegation(
    ctx: Context<StakingAction>,
    validator_id: Pubkey,
    amount: u64,
) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.decrease_delegation(caller, &validator_id, amount, now)
    })
}

pub fn unbond_delegation(ctx: Context<StakingAction>, validator_id: Pubkey) -> Result<()> {
    staking_action(ctx, |anchor_state, caller, now| {
        anchor_state.unbond_delegation(caller, &validator_id, now)
    })
}

pub fn set_validator_profile(
    ctx: Context<UpdateValidatorProfile>,
    profile: Vec<ProfileEntry>,
) -> Result<()> {
    let validator_id = ctx.accounts.signer.key();
    let entry_count = profile.len() as u64;
    ctx.accounts
        .anchor_state
        .set_validator_profile(&validator_id, profile)?;

    msg!("Validator {} updated its profile", validator_id);
    emit!(ValidatorProfileUpdated {
        validator_id,
        entry_count,
    });
    Ok(())
}

pub fn withdraw_stake(ctx: Context<WithdrawStake>) -> Result<()> {
    let user = ctx.accounts.signer.key();
    let mint = ctx.accounts.anchor_state.stake_token.mint;
    let vault = ctx.accounts.stake_vault.key();
    let vault_authority_bump = ctx.accounts.anchor_state.vault_authority_bump;

    let token_program = ctx.accounts.token_program.to_account_info();
    let transfer_accounts = Transfer {
        from: ctx.accounts.stake_vault.to_account_info(),
        to: ctx.accounts.user_token_account.to_account_info(),
        authority: ctx.accounts.vault_authority.to_account_info(),
    };

    let amount = ctx
        .accounts
        .anchor_state
        .withdraw_stake(&user, |amount| {
            let seeds: &[&[u8]] = &[VAULT_AUTHORITY_SEED, &[vault_authority_bump]];
            let signer = &[&seeds[..]];
            token::transfer(
                CpiContext::new_with_signer(token_program, transfer_accounts, signer),
                amount,
            )
        })?;

    if amount == 0 {
        msg!("No matured unbonded stake for {}", user);
        return Ok(());
    }
    msg!("Withdrew {} unbonded stake to {}", amount, user);
    emit!(StakeWithdrawn {
        user,
        amount,
        mint,
        vault,
    });
    Ok(())
}

pub fn get_owner(ctx: Context<ViewAnchor>) -> Result<Pubkey> {
    Ok(ctx.accounts.anchor_state.owner)
}

pub fn get_protocol_settings(ctx: Context<ViewAnchor>) -> Result<ProtocolSettings> {
    Ok(ctx.accounts.anchor_state.settings.protocol.clone())
}

pub fn get_appchain_settings(ctx: Context<ViewAnchor>) -> Result<AppchainSettings> {
    Ok(ctx.accounts.anchor_state.settings.appchain.clone())
}

pub fn get_anchor_settings(ctx: Context<ViewAnchor>) -> Result<AnchorSettings> {
    Ok(ctx.accounts.anchor_state.settings.anchor.clone())
}

pub fn get_appchain_state(ctx: Context<ViewAnchor>) -> Result<AppchainState> {
    Ok(ctx.accounts.anchor_state.appchain_state)
}

pub fn get_anchor_status(ctx: Context<ViewAnchor>) -> Result<AnchorStatus> {
    Ok(ctx.accounts.anchor_state.anchor_status())
}

pub fn get_stake_token(ctx: Context<ViewAnchor>) -> Result<StakeToken> {
    Ok(ctx.accounts.anchor_state.stake_token.clone())
}

pub fn get_wrapped_appchain_token(ctx: Context<ViewAnchor>) -> Result<WrappedAppchainToken> {
    Ok(ctx.accounts.anchor_state.wrapped_appchain_token.clone())
}

pub fn get_index_range_of_staking_history(ctx: Context<ViewAnchor>) -> Result<IndexRange> {
    Ok(ctx.accounts.anchor_state.staking_history.index_range())
}

pub fn get_user_staking_history_indexes(
    ctx: Context<ViewAnchor>,
    account_id: Pubkey,
) -> Result<Vec<u64>> {
    Ok(ctx
        .accounts
        .anchor_state
        .user_staking_history_indexes(&account_id))
}

pub fn get_unbonded_stakes_of(
    ctx: Context<ViewAnchor>,
    account_id: Pubkey,
) -> Result<Vec<UnbondedStakeEntry>> {
    Ok(ctx.accounts.anchor_state.unbonded_stakes_of(&account_id))
}

pub fn get_validator_list(ctx: Context<ViewAnchor>) -> Result<Vec<AppchainValidator>> {
    Ok(ctx.accounts.anchor_state.validator_list())
}

pub fn get_validator_profile(
    ctx: Context<ViewAnchor>,
    validator_id: Pubkey,
) -> Result<Vec<ProfileEntry>> {
    ctx.accounts.anchor_state.validator_profile(&validator_id)
}

pub fn get_delegators_of(ctx: Context<ViewAnchor>, validator_id: Pubkey) -> Result<Vec<Delegator>> {
    Ok(ctx.accounts.anchor_state.delegators_of(&validator_id))
}

pub fn get_staking_history(ctx: Context<ViewStakingHistory>, index: u64) -> Result<StakingHistory> {
    ctx.accounts
        .anchor_state
        .staking_history
        .ensure_in_range(index)?;
    let data = ctx.accounts.staking_history.try_borrow_data()?;
    let mut buf: &[u8] = &data;
    let record = StakingHistory::try_deserialize(&mut buf)?;
    Ok(record)
}
