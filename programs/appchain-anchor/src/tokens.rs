use crate::error::CustomErrorCode;
use anchor_lang::prelude::*;

pub const MAX_TOKEN_NAME_LEN: usize = 64;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 16;

/// The SPL token bonded as stake, with its market price.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakeToken {
    pub mint: Pubkey,
    pub decimals: u8,
    /// Price of one whole token, in USD units.
    pub price_in_usd: u64,
}

impl StakeToken {
    /// Market value of `amount` base units, in USD units.
    pub fn value_of(&self, amount: u128) -> Result<u128> {
        let scale = 10u128
            .checked_pow(u32::from(self.decimals))
            .ok_or(CustomErrorCode::AmountOverflow)?;
        let gross = amount
            .checked_mul(u128::from(self.price_in_usd))
            .ok_or(CustomErrorCode::AmountOverflow)?;
        Ok(gross / scale)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The appchain's native token as bridged into this chain.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedAppchainToken {
    pub metadata: TokenMetadata,
    pub contract_account: Option<Pubkey>,
    pub premined_beneficiary: Option<Pubkey>,
    pub premined_balance: u64,
    pub price_in_usd: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum WrappedAppchainTokenChange {
    Metadata(TokenMetadata),
    ContractAccount(Pubkey),
    PreminedBalance { beneficiary: Pubkey, value: u64 },
    Price(u64),
}

impl WrappedAppchainToken {
    pub fn apply(&mut self, change: &WrappedAppchainTokenChange) -> Result<()> {
        match change {
            WrappedAppchainTokenChange::Metadata(metadata) => {
                require!(
                    metadata.name.len() <= MAX_TOKEN_NAME_LEN
                        && metadata.symbol.len() <= MAX_TOKEN_SYMBOL_LEN,
                    CustomErrorCode::InvalidValue
                );
                self.metadata = metadata.clone();
            }
            WrappedAppchainTokenChange::ContractAccount(account) => {
                self.contract_account = Some(*account)
            }
            WrappedAppchainTokenChange::PreminedBalance { beneficiary, value } => {
                self.premined_beneficiary = Some(*beneficiary);
                self.premined_balance = *value;
            }
            WrappedAppchainTokenChange::Price(price) => self.price_in_usd = *price,
        }
        Ok(())
    }

    /// Whether everything the appchain needs to go live has been set.
    pub fn is_configured(&self) -> bool {
        self.contract_account.is_some()
            && self.premined_beneficiary.is_some()
            && !self.metadata.name.trim().is_empty()
            && !self.metadata.symbol.trim().is_empty()
            && self.metadata.decimals != 0
    }
}
