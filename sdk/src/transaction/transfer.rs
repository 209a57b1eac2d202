//! # Crypto Transfers
//!
//! Moves hbar, fungible tokens, and NFTs between accounts in one atomic
//! transaction.
//!
//! ## Accumulation
//!
//! Adding to an account that already has an entry folds the new amount
//! into the existing one, so a transfer list never mentions the same
//! account twice:
//!
//! - hbar entries are keyed by account;
//! - token entries are keyed by `(token, account)`. The approval flag is
//!   not part of the key: an approved and a plain transfer for the same
//!   pair merge, and the flag reflects the most recent call;
//! - expected decimals are only overwritten by a call that carries them;
//! - an entry whose amount nets to zero disappears;
//! - NFT transfers are never merged. Each one moves a distinct serial, and
//!   duplicates are passed through for the ledger to judge.
//!
//! Zero amounts and identifiers of the wrong kind are rejected with
//! [`Error::InvalidArgument`].

use crate::config::DEFAULT_TRANSFER_MAX_FEE;
use crate::error::{Error, Result};
use crate::id::{AccountId, EntityId, NftId, TokenId};
use crate::wire::{AccountAmount, CryptoTransferBody, NftTransfer, OperationBody, TokenTransferList};

use super::builder::{Transaction, TransactionData};

/// A transfer transaction draft.
pub type TransferTransaction = Transaction<TransferData>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HbarTransfer {
    pub account_id: AccountId,
    /// Tinybars; negative debits the account.
    pub amount: i64,
    pub is_approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token_id: TokenId,
    pub account_id: AccountId,
    /// Smallest token units; negative debits the account.
    pub amount: i64,
    pub expected_decimals: Option<u32>,
    pub is_approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNftTransfer {
    pub nft_id: NftId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub is_approved: bool,
}

/// The transfer lists, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferData {
    hbar_transfers: Vec<HbarTransfer>,
    token_transfers: Vec<TokenTransfer>,
    nft_transfers: Vec<TokenNftTransfer>,
}

impl TransferData {
    pub fn hbar_transfers(&self) -> &[HbarTransfer] {
        &self.hbar_transfers
    }

    pub fn token_transfers(&self) -> &[TokenTransfer] {
        &self.token_transfers
    }

    pub fn nft_transfers(&self) -> &[TokenNftTransfer] {
        &self.nft_transfers
    }

    fn add_hbar(&mut self, account: EntityId, amount: i64, is_approved: bool) -> Result<()> {
        let account_id = AccountId::try_from(account)?;
        check_nonzero(amount)?;

        match self.hbar_transfers.iter().position(|t| t.account_id == account_id) {
            Some(i) => {
                let sum = accumulate(self.hbar_transfers[i].amount, amount)?;
                if sum == 0 {
                    self.hbar_transfers.remove(i);
                } else {
                    let entry = &mut self.hbar_transfers[i];
                    entry.amount = sum;
                    entry.is_approved = is_approved;
                }
            }
            None => self.hbar_transfers.push(HbarTransfer {
                account_id,
                amount,
                is_approved,
            }),
        }
        Ok(())
    }

    fn add_token(
        &mut self,
        token: EntityId,
        account: EntityId,
        amount: i64,
        expected_decimals: Option<u32>,
        is_approved: bool,
    ) -> Result<()> {
        let token_id = TokenId::try_from(token)?;
        let account_id = AccountId::try_from(account)?;
        check_nonzero(amount)?;

        let existing = self
            .token_transfers
            .iter()
            .position(|t| t.token_id == token_id && t.account_id == account_id);
        match existing {
            Some(i) => {
                let sum = accumulate(self.token_transfers[i].amount, amount)?;
                if sum == 0 {
                    self.token_transfers.remove(i);
                } else {
                    let entry = &mut self.token_transfers[i];
                    entry.amount = sum;
                    entry.is_approved = is_approved;
                    if expected_decimals.is_some() {
                        entry.expected_decimals = expected_decimals;
                    }
                }
            }
            None => self.token_transfers.push(TokenTransfer {
                token_id,
                account_id,
                amount,
                expected_decimals,
                is_approved,
            }),
        }
        Ok(())
    }

    fn add_nft(&mut self, nft: EntityId, sender: EntityId, receiver: EntityId, is_approved: bool) -> Result<()> {
        let nft_id = NftId::try_from(nft)?;
        let sender = AccountId::try_from(sender)?;
        let receiver = AccountId::try_from(receiver)?;
        self.nft_transfers.push(TokenNftTransfer {
            nft_id,
            sender,
            receiver,
            is_approved,
        });
        Ok(())
    }
}

fn check_nonzero(amount: i64) -> Result<()> {
    if amount == 0 {
        return Err(Error::InvalidArgument("transfer amount must be non-zero".into()));
    }
    Ok(())
}

fn accumulate(current: i64, amount: i64) -> Result<i64> {
    current
        .checked_add(amount)
        .ok_or_else(|| Error::InvalidArgument(format!("transfer total overflows: {current} + {amount}")))
}

/// Token ids in first-seen order.
fn distinct_tokens(ids: impl Iterator<Item = TokenId>) -> Vec<TokenId> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

impl TransactionData for TransferData {
    const NAME: &'static str = "CryptoTransfer";
    const DEFAULT_MAX_TRANSACTION_FEE: u64 = DEFAULT_TRANSFER_MAX_FEE;

    /// NFT lists come first, then fungible lists, each grouped by token in
    /// the order tokens were first added.
    fn to_operation_body(&self) -> OperationBody {
        let transfers = self
            .hbar_transfers
            .iter()
            .map(|t| AccountAmount {
                account_id: t.account_id,
                amount: t.amount,
                is_approval: t.is_approved,
            })
            .collect();

        let nft_lists = distinct_tokens(self.nft_transfers.iter().map(|t| t.nft_id.token_id))
            .into_iter()
            .map(|token| TokenTransferList {
                token,
                transfers: Vec::new(),
                nft_transfers: self
                    .nft_transfers
                    .iter()
                    .filter(|t| t.nft_id.token_id == token)
                    .map(|t| NftTransfer {
                        sender_account_id: t.sender,
                        receiver_account_id: t.receiver,
                        serial_number: t.nft_id.serial,
                        is_approval: t.is_approved,
                    })
                    .collect(),
                expected_decimals: None,
            });

        let fungible_lists = distinct_tokens(self.token_transfers.iter().map(|t| t.token_id))
            .into_iter()
            .map(|token| {
                let entries: Vec<&TokenTransfer> =
                    self.token_transfers.iter().filter(|t| t.token_id == token).collect();
                TokenTransferList {
                    token,
                    transfers: entries
                        .iter()
                        .map(|t| AccountAmount {
                            account_id: t.account_id,
                            amount: t.amount,
                            is_approval: t.is_approved,
                        })
                        .collect(),
                    nft_transfers: Vec::new(),
                    expected_decimals: entries.iter().rev().find_map(|t| t.expected_decimals),
                }
            });

        OperationBody::CryptoTransfer(CryptoTransferBody {
            transfers,
            token_transfers: nft_lists.chain(fungible_lists).collect(),
        })
    }
}

impl TransferTransaction {
    /// A draft pre-filled with transfers. Every entry goes through the same
    /// validation and accumulation as the `add_*` methods.
    pub fn from_transfers(
        hbar: impl IntoIterator<Item = HbarTransfer>,
        tokens: impl IntoIterator<Item = TokenTransfer>,
        nfts: impl IntoIterator<Item = TokenNftTransfer>,
    ) -> Result<Self> {
        let mut data = TransferData::default();
        for t in hbar {
            data.add_hbar(t.account_id.into(), t.amount, t.is_approved)?;
        }
        for t in tokens {
            data.add_token(
                t.token_id.into(),
                t.account_id.into(),
                t.amount,
                t.expected_decimals,
                t.is_approved,
            )?;
        }
        for t in nfts {
            data.add_nft(t.nft_id.into(), t.sender.into(), t.receiver.into(), t.is_approved)?;
        }
        Ok(Self::from_data(data))
    }

    pub fn hbar_transfers(&self) -> &[HbarTransfer] {
        self.data().hbar_transfers()
    }

    pub fn token_transfers(&self) -> &[TokenTransfer] {
        self.data().token_transfers()
    }

    pub fn nft_transfers(&self) -> &[TokenNftTransfer] {
        self.data().nft_transfers()
    }

    pub fn add_hbar_transfer(mut self, account: impl Into<EntityId>, amount: i64) -> Result<Self> {
        self.data.add_hbar(account.into(), amount, false)?;
        Ok(self)
    }

    /// Spends from `account` under an allowance granted to the payer.
    pub fn add_approved_hbar_transfer(mut self, account: impl Into<EntityId>, amount: i64) -> Result<Self> {
        self.data.add_hbar(account.into(), amount, true)?;
        Ok(self)
    }

    pub fn add_token_transfer(
        mut self,
        token: impl Into<EntityId>,
        account: impl Into<EntityId>,
        amount: i64,
    ) -> Result<Self> {
        self.data.add_token(token.into(), account.into(), amount, None, false)?;
        Ok(self)
    }

    /// Like [`add_token_transfer`](Self::add_token_transfer), but the ledger
    /// rejects the transaction unless the token has exactly `decimals`.
    pub fn add_token_transfer_with_decimals(
        mut self,
        token: impl Into<EntityId>,
        account: impl Into<EntityId>,
        amount: i64,
        decimals: u32,
    ) -> Result<Self> {
        self.data
            .add_token(token.into(), account.into(), amount, Some(decimals), false)?;
        Ok(self)
    }

    pub fn add_approved_token_transfer(
        mut self,
        token: impl Into<EntityId>,
        account: impl Into<EntityId>,
        amount: i64,
    ) -> Result<Self> {
        self.data.add_token(token.into(), account.into(), amount, None, true)?;
        Ok(self)
    }

    pub fn add_approved_token_transfer_with_decimals(
        mut self,
        token: impl Into<EntityId>,
        account: impl Into<EntityId>,
        amount: i64,
        decimals: u32,
    ) -> Result<Self> {
        self.data
            .add_token(token.into(), account.into(), amount, Some(decimals), true)?;
        Ok(self)
    }

    pub fn add_nft_transfer(
        mut self,
        nft: impl Into<EntityId>,
        sender: impl Into<EntityId>,
        receiver: impl Into<EntityId>,
    ) -> Result<Self> {
        self.data.add_nft(nft.into(), sender.into(), receiver.into(), false)?;
        Ok(self)
    }

    pub fn add_approved_nft_transfer(
        mut self,
        nft: impl Into<EntityId>,
        sender: impl Into<EntityId>,
        receiver: impl Into<EntityId>,
    ) -> Result<Self> {
        self.data.add_nft(nft.into(), sender.into(), receiver.into(), true)?;
        Ok(self)
    }
}
