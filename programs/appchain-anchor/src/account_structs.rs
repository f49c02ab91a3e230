use crate::error::*;
use crate::history::StakingHistory;
use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use anchor_lang::solana_program::bpf_loader_upgradeable::{self};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = signer,
        space = AnchorState::INITIAL_SPACE,
        seeds = [ANCHOR_STATE_SEED],
        bump
    )]
    pub anchor_state: Account<'info, AnchorState>,

    /// CHECK: This is a PDA that acts as vault authority, validated by seeds constraint
    /// It becomes the owner of the stake vault, so only this program can move
    /// bonded stake back out.
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// The token account holding all bonded stake
    #[account(
        mut,
        constraint = stake_vault.mint == stake_mint.key() @ CustomErrorCode::InvalidMint,
        constraint = (stake_vault.owner == signer.key() || stake_vault.owner == vault_authority.key()) @ CustomErrorCode::InvalidVaultAuthority
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    pub stake_mint: Account<'info, Mint>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,

    /// CHECK: This is the program data account that contains the update authority
    #[account(
        constraint = program_data.key() == get_program_data_address(&crate::id()) @ CustomErrorCode::InvalidProgramData
    )]
    pub program_data: UncheckedAccount<'info>,
}

/// Owner and role-holder instructions. Authorization happens in the handler
/// against the roles stored in the anchor state.
#[derive(Accounts)]
pub struct ManageAnchor<'info> {
    #[account(
        mut,
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump,
        realloc = anchor_state.required_space(),
        realloc::payer = signer,
        realloc::zero = false
    )]
    pub anchor_state: Account<'info, AnchorState>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct DepositStake<'info> {
    #[account(
        mut,
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump,
        realloc = anchor_state.required_space(),
        realloc::payer = signer,
        realloc::zero = false
    )]
    pub anchor_state: Account<'info, AnchorState>,

    /// Receives the fact recorded by this deposit
    #[account(
        init,
        payer = signer,
        space = StakingHistory::LEN,
        seeds = [STAKING_HISTORY_SEED, anchor_state.staking_history.next_index().to_le_bytes().as_ref()],
        bump
    )]
    pub staking_history: Account<'info, StakingHistory>,

    #[account(
        mut,
        token::mint = anchor_state.stake_token.mint,
        constraint = stake_vault.key() == anchor_state.stake_vault @ CustomErrorCode::InvalidVaultAuthority,
        constraint = stake_vault.owner == vault_authority.key() @ CustomErrorCode::InvalidVaultAuthority
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    /// CHECK: This is a PDA that acts as vault authority, validated by seeds constraint
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = anchor_state.vault_authority_bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = anchor_state.stake_token.mint,
        constraint = user_token_account.owner == signer.key() @ CustomErrorCode::InvalidTokenOwner
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Profile update of the signing validator; records no staking fact.
#[derive(Accounts)]
pub struct UpdateValidatorProfile<'info> {
    #[account(
        mut,
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump,
        realloc = anchor_state.required_space(),
        realloc::payer = signer,
        realloc::zero = false
    )]
    pub anchor_state: Account<'info, AnchorState>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Direct staking actions of the signer that record one staking fact.
#[derive(Accounts)]
pub struct StakingAction<'info> {
    #[account(
        mut,
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump,
        realloc = anchor_state.required_space(),
        realloc::payer = signer,
        realloc::zero = false
    )]
    pub anchor_state: Account<'info, AnchorState>,

    #[account(
        init,
        payer = signer,
        space = StakingHistory::LEN,
        seeds = [STAKING_HISTORY_SEED, anchor_state.staking_history.next_index().to_le_bytes().as_ref()],
        bump
    )]
    pub staking_history: Account<'info, StakingHistory>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawStake<'info> {
    #[account(
        mut,
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump,
        realloc = anchor_state.required_space(),
        realloc::payer = signer,
        realloc::zero = false
    )]
    pub anchor_state: Account<'info, AnchorState>,

    #[account(
        mut,
        token::mint = anchor_state.stake_token.mint,
        constraint = stake_vault.key() == anchor_state.stake_vault @ CustomErrorCode::InvalidVaultAuthority,
        constraint = stake_vault.owner == vault_authority.key() @ CustomErrorCode::InvalidVaultAuthority
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    /// CHECK: This is a PDA that acts as vault authority, validated by seeds constraint
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = anchor_state.vault_authority_bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = anchor_state.stake_token.mint,
        constraint = user_token_account.owner == signer.key() @ CustomErrorCode::InvalidTokenOwner
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ViewAnchor<'info> {
    #[account(
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump
    )]
    pub anchor_state: Account<'info, AnchorState>,
}

#[derive(Accounts)]
#[instruction(index: u64)]
pub struct ViewStakingHistory<'info> {
    #[account(
        seeds = [ANCHOR_STATE_SEED],
        bump = anchor_state.bump
    )]
    pub anchor_state: Account<'info, AnchorState>,

    /// CHECK: Address is validated by seeds; the handler checks the index range
    /// before deserializing, since out-of-range indexes have no account.
    #[account(
        seeds = [STAKING_HISTORY_SEED, index.to_le_bytes().as_ref()],
        bump
    )]
    pub staking_history: UncheckedAccount<'info>,
}

fn get_program_data_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[program_id.as_ref()], &bpf_loader_upgradeable::id()).0
}
