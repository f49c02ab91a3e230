use crate::error::CustomErrorCode;
use crate::guard::{require_capability, Authorizer, Capability};
use crate::lifecycle::{AppchainState, NextEraProjection};
use crate::settings::{AnchorSettingChange, AppchainSettingChange, ProtocolSettingChange};
use crate::state::AnchorState;
use crate::tokens::WrappedAppchainTokenChange;
use anchor_lang::prelude::*;

impl AnchorState {
    pub fn change_protocol_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[ProtocolSettingChange],
    ) -> Result<()> {
        self.settings
            .change_protocol_settings(authorizer, caller, changes)
    }

    pub fn change_appchain_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[AppchainSettingChange],
    ) -> Result<()> {
        self.settings
            .change_appchain_settings(authorizer, caller, changes)
    }

    pub fn change_anchor_settings<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[AnchorSettingChange],
    ) -> Result<()> {
        self.settings
            .change_anchor_settings(authorizer, caller, changes)
    }

    pub fn change_wrapped_appchain_token<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        changes: &[WrappedAppchainTokenChange],
    ) -> Result<()> {
        require_capability(authorizer, caller, Capability::Governance)?;
        let mut next = self.wrapped_appchain_token.clone();
        for change in changes {
            next.apply(change)?;
        }
        self.wrapped_appchain_token = next;
        Ok(())
    }

    pub fn next_era_projection(&self) -> NextEraProjection {
        NextEraProjection {
            total_stake: self.ledger.total_stake(),
            validator_count: self.ledger.validator_count(),
        }
    }

    pub fn go_booting<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
    ) -> Result<AppchainState> {
        require_capability(authorizer, caller, Capability::Governance)?;
        let projection = self.next_era_projection();
        self.appchain_state
            .go_booting(&self.settings.protocol, &self.stake_token, projection)?;
        Ok(self.appchain_state)
    }

    pub fn go_live<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
    ) -> Result<AppchainState> {
        require_capability(authorizer, caller, Capability::Governance)?;
        self.appchain_state.go_live(&self.wrapped_appchain_token)?;
        Ok(self.appchain_state)
    }

    pub fn go_broken<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
    ) -> Result<AppchainState> {
        require_capability(authorizer, caller, Capability::Governance)?;
        self.appchain_state.go_broken()?;
        Ok(self.appchain_state)
    }

    /// Returns the previous owner.
    pub fn set_owner<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        new_owner: Pubkey,
    ) -> Result<Pubkey> {
        require_capability(authorizer, caller, Capability::Governance)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Returns the previous price.
    pub fn set_price_of_stake_token<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        price_in_usd: u64,
    ) -> Result<u64> {
        require_capability(authorizer, caller, Capability::TokenPriceMaintenance)?;
        Ok(std::mem::replace(
            &mut self.stake_token.price_in_usd,
            price_in_usd,
        ))
    }

    /// Advances the era counter by one and returns the new era.
    pub fn switch_era<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
    ) -> Result<u64> {
        require_capability(authorizer, caller, Capability::EraSwitching)?;
        self.era_number = self
            .era_number
            .checked_add(1)
            .ok_or(CustomErrorCode::AmountOverflow)?;
        Ok(self.era_number)
    }

    pub fn pause_asset_transfer<A: Authorizer + ?Sized>(
        &mut self,
        authorizer: &A,
        caller: &Pubkey,
        paused: bool,
    ) -> Result<()> {
        require_capability(authorizer, caller, Capability::Governance)?;
        self.asset_transfer_is_paused = paused;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error, new_anchor_state, registration};
    use crate::tokens::TokenMetadata;

    #[test]
    fn only_owner_drives_lifecycle() {
        let owner = Pubkey::new_unique();
        let mut state = new_anchor_state(owner);
        let roles = state.roles();
        let stranger = Pubkey::new_unique();
        assert_error(
            state.go_booting(&roles, &stranger),
            CustomErrorCode::Unauthorized,
        );
        assert_error(state.go_live(&roles, &stranger), CustomErrorCode::Unauthorized);
        assert_error(
            state.set_owner(&roles, &stranger, stranger),
            CustomErrorCode::Unauthorized,
        );
        assert_eq!(state.owner, owner);

        let previous = state.set_owner(&roles, &owner, stranger).unwrap();
        assert_eq!(previous, owner);
        assert_eq!(state.owner, stranger);
    }

    #[test]
    fn price_maintainer_sets_price_only() {
        let owner = Pubkey::new_unique();
        let maintainer = Pubkey::new_unique();
        let mut state = new_anchor_state(owner);
        let roles = state.roles();
        state
            .change_anchor_settings(
                &roles,
                &owner,
                &[AnchorSettingChange::TokenPriceMaintainerAccount(Some(
                    maintainer,
                ))],
            )
            .unwrap();

        let roles = state.roles();
        state.set_price_of_stake_token(&roles, &maintainer, 7).unwrap();
        assert_eq!(state.stake_token.price_in_usd, 7);
        assert_error(
            state.pause_asset_transfer(&roles, &maintainer, true),
            CustomErrorCode::Unauthorized,
        );
    }

    #[test]
    fn relayer_switches_eras() {
        let owner = Pubkey::new_unique();
        let relayer = Pubkey::new_unique();
        let mut state = new_anchor_state(owner);
        state.settings.anchor.relayer_account = Some(relayer);
        let roles = state.roles();
        assert_eq!(state.switch_era(&roles, &relayer).unwrap(), 1);
        assert_eq!(state.switch_era(&roles, &owner).unwrap(), 2);
        assert_error(
            state.switch_era(&roles, &Pubkey::new_unique()),
            CustomErrorCode::Unauthorized,
        );
        assert_eq!(state.era_number, 2);
    }

    #[test]
    fn booting_uses_stake_token_price() {
        let owner = Pubkey::new_unique();
        let mut state = new_anchor_state(owner);
        state.settings.protocol.minimum_validator_count = 1;
        state.settings.protocol.minimum_total_stake_price_for_booting = 10_000;
        state.stake_token.decimals = 0;
        state.stake_token.price_in_usd = 1;
        state
            .register_validator(registration(Pubkey::new_unique(), 5_000, 1), 0)
            .unwrap();
        let roles = state.roles();
        assert_error(
            state.go_booting(&roles, &owner),
            CustomErrorCode::PreconditionNotMet,
        );
        state.set_price_of_stake_token(&roles, &owner, 2).unwrap();
        assert_eq!(
            state.go_booting(&roles, &owner).unwrap(),
            AppchainState::Booting
        );
    }

    #[test]
    fn wrapped_token_batch_is_all_or_nothing() {
        let owner = Pubkey::new_unique();
        let mut state = new_anchor_state(owner);
        let roles = state.roles();
        let result = state.change_wrapped_appchain_token(
            &roles,
            &owner,
            &[
                WrappedAppchainTokenChange::ContractAccount(Pubkey::new_unique()),
                WrappedAppchainTokenChange::Metadata(TokenMetadata {
                    name: "n".repeat(200),
                    symbol: "WAPP".to_string(),
                    decimals: 18,
                }),
            ],
        );
        assert_error(result, CustomErrorCode::InvalidValue);
        assert_eq!(state.wrapped_appchain_token.contract_account, None);
    }
}
