use crate::error::CustomErrorCode;
use anchor_lang::prelude::*;

#[allow(deprecated)]
use anchor_lang::solana_program::bpf_loader_upgradeable::UpgradeableLoaderState;

/// Privileges a caller may hold over the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Settings changes, lifecycle transitions, ownership transfer.
    Governance,
    /// Updating the market price of the stake token.
    TokenPriceMaintenance,
    /// Advancing the era counter.
    EraSwitching,
}

/// Decides whether `caller` holds `capability`.
pub trait Authorizer {
    fn authorize(&self, caller: &Pubkey, capability: Capability) -> bool;
}

/// Role holders as stored in the anchor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorRoles {
    pub owner: Pubkey,
    pub token_price_maintainer: Option<Pubkey>,
    pub relayer: Option<Pubkey>,
}

impl Authorizer for AnchorRoles {
    fn authorize(&self, caller: &Pubkey, capability: Capability) -> bool {
        if *caller == self.owner {
            return true;
        }
        match capability {
            Capability::Governance => false,
            Capability::TokenPriceMaintenance => self.token_price_maintainer == Some(*caller),
            Capability::EraSwitching => self.relayer == Some(*caller),
        }
    }
}

pub fn require_capability<A: Authorizer + ?Sized>(
    authorizer: &A,
    caller: &Pubkey,
    capability: Capability,
) -> Result<()> {
    require!(
        authorizer.authorize(caller, capability),
        CustomErrorCode::Unauthorized
    );
    Ok(())
}

/// Only the program's upgrade authority may bootstrap the anchor.
pub fn validate_program_update_authority(
    program_data_account: &UncheckedAccount,
    authority: &Signer,
) -> Result<()> {
    let program_data = program_data_account
        .try_borrow_data()
        .map_err(|_| CustomErrorCode::InvalidProgramData)?;

    let loader_state = bincode::deserialize::<UpgradeableLoaderState>(&program_data)
        .map_err(|_| CustomErrorCode::InvalidProgramData)?;

    match loader_state {
        UpgradeableLoaderState::ProgramData {
            upgrade_authority_address: Some(update_authority),
            ..
        } => {
            require_keys_eq!(
                authority.key(),
                update_authority,
                CustomErrorCode::InvalidUpgradeAuthority
            );
            Ok(())
        }
        UpgradeableLoaderState::ProgramData {
            upgrade_authority_address: None,
            ..
        } => Err(CustomErrorCode::NoUpgradeAuthority.into()),
        _ => Err(CustomErrorCode::InvalidProgramData.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_error;

    /// Grants everything to one account, nothing to anyone else.
    struct SingleKey(Pubkey);

    impl Authorizer for SingleKey {
        fn authorize(&self, caller: &Pubkey, _capability: Capability) -> bool {
            *caller == self.0
        }
    }

    #[test]
    fn owner_holds_every_capability() {
        let roles = AnchorRoles {
            owner: Pubkey::new_unique(),
            token_price_maintainer: None,
            relayer: None,
        };
        for capability in [
            Capability::Governance,
            Capability::TokenPriceMaintenance,
            Capability::EraSwitching,
        ] {
            assert!(roles.authorize(&roles.owner, capability));
        }
    }

    #[test]
    fn delegated_roles_are_scoped() {
        let maintainer = Pubkey::new_unique();
        let relayer = Pubkey::new_unique();
        let roles = AnchorRoles {
            owner: Pubkey::new_unique(),
            token_price_maintainer: Some(maintainer),
            relayer: Some(relayer),
        };
        assert!(roles.authorize(&maintainer, Capability::TokenPriceMaintenance));
        assert!(!roles.authorize(&maintainer, Capability::Governance));
        assert!(!roles.authorize(&maintainer, Capability::EraSwitching));
        assert!(roles.authorize(&relayer, Capability::EraSwitching));
        assert!(!roles.authorize(&relayer, Capability::TokenPriceMaintenance));
    }

    #[test]
    fn injected_authorizer_is_honored() {
        let key = Pubkey::new_unique();
        let authorizer = SingleKey(key);
        require_capability(&authorizer, &key, Capability::Governance).unwrap();
        assert_error(
            require_capability(&authorizer, &Pubkey::new_unique(), Capability::Governance),
            CustomErrorCode::Unauthorized,
        );
    }
}
