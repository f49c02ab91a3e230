//! Stake leaving the validator set, held until its unlock era.

use crate::error::CustomErrorCode;
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnbondedStakeEntry {
    pub amount: u64,
    /// Era in which the stake was unbonded.
    pub era_number: u64,
    /// First era in which the entry may be withdrawn.
    pub unlock_era: u64,
    /// Index of the staking fact that created this entry.
    pub staking_history_index: u64,
}

impl UnbondedStakeEntry {
    pub fn is_mature(&self, current_era: u64) -> bool {
        current_era >= self.unlock_era
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountUnbondedStakes {
    pub account_id: Pubkey,
    pub entries: Vec<UnbondedStakeEntry>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnbondingQueue {
    accounts: Vec<AccountUnbondedStakes>,
}

impl UnbondingQueue {
    pub fn push(&mut self, account_id: &Pubkey, entry: UnbondedStakeEntry) {
        match self
            .accounts
            .iter_mut()
            .find(|a| a.account_id == *account_id)
        {
            Some(account) => account.entries.push(entry),
            None => self.accounts.push(AccountUnbondedStakes {
                account_id: *account_id,
                entries: vec![entry],
            }),
        }
    }

    pub fn entries_of(&self, account_id: &Pubkey) -> Vec<UnbondedStakeEntry> {
        self.accounts
            .iter()
            .find(|a| a.account_id == *account_id)
            .map(|a| a.entries.clone())
            .unwrap_or_default()
    }

    pub fn matured_amount(&self, account_id: &Pubkey, current_era: u64) -> Result<u64> {
        self.entries_of(account_id)
            .iter()
            .filter(|e| e.is_mature(current_era))
            .try_fold(0u64, |sum, e| {
                sum.checked_add(e.amount)
                    .ok_or_else(|| CustomErrorCode::AmountOverflow.into())
            })
    }

    /// Pays out every matured entry of `account_id` through `transfer`.
    ///
    /// Entries are removed only after `transfer` succeeds, so a failed payout
    /// leaves the queue untouched. Returns the amount paid, `0` when nothing
    /// had matured (in which case `transfer` is never called).
    pub fn withdraw_with<F>(&mut self, account_id: &Pubkey, current_era: u64, transfer: F) -> Result<u64>
    where
        F: FnOnce(u64) -> Result<()>,
    {
        let amount = self.matured_amount(account_id, current_era)?;
        if amount == 0 {
            return Ok(0);
        }
        transfer(amount)?;

        if let Some(position) = self
            .accounts
            .iter()
            .position(|a| a.account_id == *account_id)
        {
            let account = &mut self.accounts[position];
            account.entries.retain(|e| !e.is_mature(current_era));
            if account.entries.is_empty() {
                self.accounts.remove(position);
            }
        }
        Ok(amount)
    }
}
