//! Appchain lifecycle: `Staging -> Booting -> Active`, with `Broken` as a
//! terminal failure state. Transitions are one-directional.

use crate::error::CustomErrorCode;
use crate::settings::ProtocolSettings;
use crate::tokens::{StakeToken, WrappedAppchainToken};
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppchainState {
    /// Validators and delegators may bond stake.
    Staging,
    /// Stake is frozen while the appchain boots.
    Booting,
    /// The appchain is running normally.
    Active,
    /// Terminal. Only exits (unbond, withdraw) remain possible.
    Broken,
}

/// Projection of the next era used to decide whether booting may start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextEraProjection {
    pub total_stake: u128,
    pub validator_count: u64,
}

impl AppchainState {
    /// Registering, increasing and decreasing stake.
    pub fn ensure_staking_allowed(&self) -> Result<()> {
        match self {
            AppchainState::Staging | AppchainState::Active => Ok(()),
            _ => Err(CustomErrorCode::InvalidState.into()),
        }
    }

    /// Leaving a stake position entirely.
    pub fn ensure_unbonding_allowed(&self) -> Result<()> {
        match self {
            AppchainState::Staging | AppchainState::Active | AppchainState::Broken => Ok(()),
            AppchainState::Booting => Err(CustomErrorCode::InvalidState.into()),
        }
    }

    pub fn go_booting(
        &mut self,
        settings: &ProtocolSettings,
        stake_token: &StakeToken,
        projection: NextEraProjection,
    ) -> Result<()> {
        require!(
            *self == AppchainState::Staging,
            CustomErrorCode::InvalidState
        );
        require!(
            projection.validator_count >= settings.minimum_validator_count,
            CustomErrorCode::PreconditionNotMet
        );
        require!(
            stake_token.value_of(projection.total_stake)?
                >= u128::from(settings.minimum_total_stake_price_for_booting),
            CustomErrorCode::PreconditionNotMet
        );
        *self = AppchainState::Booting;
        Ok(())
    }

    pub fn go_live(&mut self, wrapped_appchain_token: &WrappedAppchainToken) -> Result<()> {
        require!(
            *self == AppchainState::Booting,
            CustomErrorCode::InvalidState
        );
        require!(
            wrapped_appchain_token.is_configured(),
            CustomErrorCode::PreconditionNotMet
        );
        *self = AppchainState::Active;
        Ok(())
    }

    pub fn go_broken(&mut self) -> Result<()> {
        match self {
            AppchainState::Booting | AppchainState::Active => {
                *self = AppchainState::Broken;
                Ok(())
            }
            _ => Err(CustomErrorCode::InvalidState.into()),
        }
    }
}
