//! Staged construction of a transaction.
//!
//! A [`TransactionDraft`] owns a record while it is still being filled in
//! and tracks where it is in its lifecycle:
//!
//! ```text
//! Empty -> Populated -> Signed -> [DoubleSigned] -> Identified -> Finalized
//! ```
//!
//! Every step checks the current stage first. A signature can never be
//! overwritten, a second signature can never come first, and nothing can be
//! changed once the ID is stamped.

use std::fmt;

use tracing::debug;

use super::error::TransactionError;
use super::record::Transaction;
use super::types::{Asset, TransactionType};

/// Lifecycle position of a [`TransactionDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Empty,
    Populated,
    Signed,
    DoubleSigned,
    Identified,
    Finalized,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The common fields every transaction type fills in during population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    pub amount: u64,
    pub fee: u64,
    pub recipient_id: Option<String>,
    pub vendor_field: Option<String>,
    pub timestamp: u32,
    pub sender_public_key: String,
}

/// A transaction under construction.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    tx: Transaction,
    stage: Stage,
}

impl TransactionDraft {
    /// Starts an empty draft. The type is fixed from here on.
    pub fn new(tx_type: TransactionType) -> Self {
        Self {
            tx: Transaction::empty(tx_type),
            stage: Stage::Empty,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Read access to the record in its current state.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Fills in the common fields and the asset payload. `Empty -> Populated`.
    ///
    /// Rejects any field the draft's type does not allow:
    ///
    /// - an asset that belongs to another type, or a missing one;
    /// - a vendor field or a non-zero amount outside a transfer;
    /// - a missing recipient on a transfer or vote, or any recipient on a
    ///   registration.
    ///
    /// On error the draft stays `Empty`.
    pub fn populate(
        &mut self,
        fields: TransactionFields,
        asset: Option<Asset>,
    ) -> Result<(), TransactionError> {
        self.check_transition(Stage::Populated)?;

        let tx = Transaction {
            amount: fields.amount,
            fee: fields.fee,
            recipient_id: fields.recipient_id,
            vendor_field: fields.vendor_field,
            timestamp: fields.timestamp,
            sender_public_key: fields.sender_public_key,
            asset,
            ..Transaction::empty(self.tx.tx_type)
        };
        tx.check_fields()?;
        tx.check_asset()?;
        self.tx = tx;

        self.stage = Stage::Populated;
        Ok(())
    }

    /// Stamps `id = hex(sha256(to_bytes(false, false)))`.
    /// `Signed | DoubleSigned -> Identified`.
    pub fn identify(&mut self) -> Result<&str, TransactionError> {
        self.check_transition(Stage::Identified)?;
        self.tx.id = self.tx.compute_id()?;
        self.stage = Stage::Identified;
        Ok(&self.tx.id)
    }

    /// Hands out the finished record. `Identified -> Finalized`.
    ///
    /// The draft stays behind in the `Finalized` stage and refuses any
    /// further transition, including a second call to `finalize`.
    pub fn finalize(&mut self) -> Result<Transaction, TransactionError> {
        self.check_transition(Stage::Finalized)?;
        self.stage = Stage::Finalized;
        debug!(
            tx_type = %self.tx.tx_type,
            id = %self.tx.id,
            second_signed = self.tx.is_second_signed(),
            "transaction finalized"
        );
        Ok(self.tx.clone())
    }

    /// Stores the primary signature. `Populated -> Signed`.
    pub(crate) fn attach_signature(&mut self, signature: String) -> Result<(), TransactionError> {
        self.check_transition(Stage::Signed)?;
        self.tx.signature = Some(signature);
        self.stage = Stage::Signed;
        Ok(())
    }

    /// Stores the second signature. `Signed -> DoubleSigned`.
    pub(crate) fn attach_second_signature(
        &mut self,
        sign_signature: String,
    ) -> Result<(), TransactionError> {
        self.check_transition(Stage::DoubleSigned)?;
        self.tx.sign_signature = Some(sign_signature);
        self.stage = Stage::DoubleSigned;
        Ok(())
    }

    /// Checks whether moving from the current stage to `to` is allowed,
    /// without changing anything.
    pub fn check_transition(&self, to: Stage) -> Result<(), TransactionError> {
        let allowed = match to {
            Stage::Empty => false,
            Stage::Populated => self.stage == Stage::Empty,
            Stage::Signed => self.stage == Stage::Populated,
            Stage::DoubleSigned => {
                if matches!(self.stage, Stage::Empty | Stage::Populated) {
                    return Err(TransactionError::MissingPrimarySignature);
                }
                self.stage == Stage::Signed && self.tx.tx_type.allows_second_signature()
            }
            Stage::Identified => matches!(self.stage, Stage::Signed | Stage::DoubleSigned),
            Stage::Finalized => self.stage == Stage::Identified,
        };

        if allowed {
            Ok(())
        } else {
            Err(TransactionError::InvalidTransition {
                from: self.stage,
                to,
            })
        }
    }
}
