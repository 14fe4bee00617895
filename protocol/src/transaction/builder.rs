//! Per-type transaction construction.
//!
//! [`TransactionBuilder`] turns an intent ("pay X to Y", "vote for Z") into
//! a finalized, signed, identified [`Transaction`]. Each `create_*` method
//! follows the same skeleton:
//!
//! 1. Derive the sender keypair from the secret.
//! 2. Populate a [`TransactionDraft`] with the common fields, the fee from
//!    the network's fee table, and the type's asset.
//! 3. Sign, and second-sign if a second secret was given.
//! 4. Stamp the ID and finalize.
//!
//! Keypairs are derived inside the call and dropped before it returns.

use tracing::{debug, warn};

use super::draft::{TransactionDraft, TransactionFields};
use super::error::TransactionError;
use super::record::Transaction;
use super::signing::{second_sign_transaction, sign_transaction};
use super::types::{Asset, DelegateAsset, MultiSignatureAsset, SignatureAsset, TransactionType};
use crate::config::{NetworkParams, VendorFieldPolicy, MAX_VENDOR_FIELD_CONTENT};
use crate::crypto::address;
use crate::crypto::keys::ArkKeypair;

/// Builds signed transactions for one network.
///
/// # Usage
///
/// ```
/// use ark_protocol::config::NetworkParams;
/// use ark_protocol::transaction::{TransactionBuilder, TransactionType};
///
/// let builder = TransactionBuilder::new(NetworkParams::devnet());
/// let tx = builder
///     .create_transfer("D61mfSggzbvQgTUe6JhYKH2doHaqJ3Dyib", 100_000_000, Some("test"), "s1", None)
///     .unwrap();
///
/// assert_eq!(tx.tx_type, TransactionType::Transfer);
/// assert!(tx.signature.is_some());
/// assert!(tx.sign_signature.is_none());
/// ```
///
/// The timestamp defaults to the current time relative to the network epoch.
/// Use [`at_timestamp`](Self::at_timestamp) to pin it.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    params: NetworkParams,
    timestamp: Option<u32>,
}

impl TransactionBuilder {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            timestamp: None,
        }
    }

    /// Pins the timestamp (seconds since the network epoch) for every
    /// transaction this builder creates.
    pub fn at_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Value transfer to `recipient_id`.
    ///
    /// An empty `vendor_field` is treated as absent. The finished record
    /// carries no `asset` key.
    pub fn create_transfer(
        &self,
        recipient_id: &str,
        amount: u64,
        vendor_field: Option<&str>,
        secret: &str,
        second_secret: Option<&str>,
    ) -> Result<Transaction, TransactionError> {
        let vendor_field = self.check_vendor_field(vendor_field)?;
        self.check_recipient(recipient_id)?;

        let keys = ArkKeypair::from_passphrase(secret)?;
        let fields = TransactionFields {
            amount,
            fee: self.fee(TransactionType::Transfer, 0)?,
            recipient_id: Some(recipient_id.to_string()),
            vendor_field,
            timestamp: self.timestamp(),
            sender_public_key: keys.public_key_hex(),
        };

        self.complete(TransactionType::Transfer, fields, None, &keys, second_secret)
    }

    /// Registers the public key of `second_passphrase` as the account's
    /// second signature. Signed by `first_passphrase` only: the second key
    /// is not active until this transaction is confirmed.
    pub fn create_second_signature(
        &self,
        second_passphrase: &str,
        first_passphrase: &str,
    ) -> Result<Transaction, TransactionError> {
        let second_public_key = ArkKeypair::from_passphrase(second_passphrase)?.public_key_hex();
        let keys = ArkKeypair::from_passphrase(first_passphrase)?;

        let fields = TransactionFields {
            fee: self.fee(TransactionType::SecondSignature, 0)?,
            timestamp: self.timestamp(),
            sender_public_key: keys.public_key_hex(),
            ..TransactionFields::default()
        };
        let asset = Asset::Signature(SignatureAsset {
            public_key: second_public_key,
        });

        self.complete(TransactionType::SecondSignature, fields, Some(asset), &keys, None)
    }

    /// Casts votes. Entries are prefixed public keys (`+<hex>` / `-<hex>`,
    /// see [`Vote`](super::Vote)) and are serialized in the order given.
    ///
    /// Votes are self-addressed: `recipientId` is the sender's own address,
    /// encoded with `self.params.address_version`. There is no separate
    /// network argument; build with mainnet or devnet params to pick one.
    pub fn create_vote(
        &self,
        votes: Vec<String>,
        secret: &str,
        second_secret: Option<&str>,
    ) -> Result<Transaction, TransactionError> {
        let keys = ArkKeypair::from_passphrase(secret)?;
        let recipient_id = address::from_public_key(&keys.public_key(), self.params.address_version);

        let fields = TransactionFields {
            fee: self.fee(TransactionType::Vote, 0)?,
            recipient_id: Some(recipient_id),
            timestamp: self.timestamp(),
            sender_public_key: keys.public_key_hex(),
            ..TransactionFields::default()
        };

        self.complete(TransactionType::Vote, fields, Some(Asset::Votes(votes)), &keys, second_secret)
    }

    /// Registers the sender as a delegate named `username`.
    pub fn create_delegate(
        &self,
        username: &str,
        secret: &str,
        second_secret: Option<&str>,
    ) -> Result<Transaction, TransactionError> {
        let keys = ArkKeypair::from_passphrase(secret)?;
        let fields = TransactionFields {
            fee: self.fee(TransactionType::Delegate, 0)?,
            timestamp: self.timestamp(),
            sender_public_key: keys.public_key_hex(),
            ..TransactionFields::default()
        };
        let asset = Asset::Delegate(DelegateAsset {
            username: username.to_string(),
            public_key: keys.public_key_hex(),
        });

        self.complete(TransactionType::Delegate, fields, Some(asset), &keys, second_secret)
    }

    /// Converts the sender into a multi-signature account.
    ///
    /// The fee is charged per participant, the sender included:
    /// `(keysgroup.len() + 1) * fees.multi_signature`.
    pub fn create_multi_signature(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        keysgroup: Vec<String>,
        lifetime: u8,
        min: u8,
    ) -> Result<Transaction, TransactionError> {
        let fee = self.fee(TransactionType::MultiSignature, keysgroup.len())?;
        let keys = ArkKeypair::from_passphrase(secret)?;

        let fields = TransactionFields {
            fee,
            timestamp: self.timestamp(),
            sender_public_key: keys.public_key_hex(),
            ..TransactionFields::default()
        };
        let asset = Asset::MultiSignature(MultiSignatureAsset {
            min,
            lifetime,
            keysgroup,
        });

        self.complete(TransactionType::MultiSignature, fields, Some(asset), &keys, second_secret)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn complete(
        &self,
        tx_type: TransactionType,
        fields: TransactionFields,
        asset: Option<Asset>,
        keys: &ArkKeypair,
        second_secret: Option<&str>,
    ) -> Result<Transaction, TransactionError> {
        debug!(
            network = %self.params.name,
            %tx_type,
            fee = fields.fee,
            amount = fields.amount,
            timestamp = fields.timestamp,
            "building transaction"
        );

        let mut draft = TransactionDraft::new(tx_type);
        draft.populate(fields, asset)?;
        sign_transaction(&mut draft, keys)?;

        if let Some(second_secret) = second_secret.filter(|s| !s.is_empty()) {
            let second_keys = ArkKeypair::from_passphrase(second_secret)?;
            second_sign_transaction(&mut draft, &second_keys)?;
        }

        draft.identify()?;
        draft.finalize()
    }

    fn timestamp(&self) -> u32 {
        self.timestamp
            .unwrap_or_else(|| self.params.epoch_time_now())
    }

    fn fee(&self, tx_type: TransactionType, keysgroup_len: usize) -> Result<u64, TransactionError> {
        self.params
            .fees
            .fee_for(tx_type, keysgroup_len)
            .ok_or(TransactionError::FeeOverflow {
                participants: keysgroup_len + 1,
            })
    }

    fn check_vendor_field(
        &self,
        vendor_field: Option<&str>,
    ) -> Result<Option<String>, TransactionError> {
        let Some(content) = vendor_field.filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        if content.len() > MAX_VENDOR_FIELD_CONTENT {
            match self.params.vendor_field_policy {
                VendorFieldPolicy::Strict => {
                    warn!(len = content.len(), "vendor field does not fit the wire slot");
                    return Err(TransactionError::VendorFieldOverflow {
                        len: content.len(),
                        max: MAX_VENDOR_FIELD_CONTENT,
                    });
                }
                VendorFieldPolicy::Legacy => {
                    warn!(
                        len = content.len(),
                        "vendor field does not fit the wire slot, it will not be signed"
                    );
                }
            }
        }

        Ok(Some(content.to_string()))
    }

    fn check_recipient(&self, recipient_id: &str) -> Result<(), TransactionError> {
        let version = address::version_of(recipient_id)?;
        if version != self.params.address_version {
            warn!(
                recipient = recipient_id,
                version,
                expected = self.params.address_version,
                "recipient address belongs to a different network"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DELEGATE_FEE, MULTI_SIGNATURE_UNIT_FEE, SECOND_SIGNATURE_FEE, TRANSFER_FEE, VOTE_FEE,
    };
    use crate::transaction::error::ErrorKind;

    const RECIPIENT: &str = "D61mfSggzbvQgTUe6JhYKH2doHaqJ3Dyib";

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(NetworkParams::devnet()).at_timestamp(1_000_000)
    }

    fn keysgroup(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                let pk = ArkKeypair::from_passphrase(&format!("participant {i}"))
                    .unwrap()
                    .public_key_hex();
                format!("+{pk}")
            })
            .collect()
    }

    #[test]
    fn transfer_fields() {
        let tx = builder()
            .create_transfer(RECIPIENT, 100_000_000, Some("test"), "s1", None)
            .unwrap();
        assert_eq!(tx.tx_type, TransactionType::Transfer);
        assert_eq!(tx.fee, TRANSFER_FEE);
        assert_eq!(tx.amount, 100_000_000);
        assert_eq!(tx.timestamp, 1_000_000);
        assert_eq!(tx.recipient_id.as_deref(), Some(RECIPIENT));
        assert_eq!(tx.vendor_field.as_deref(), Some("test"));
        assert!(tx.asset.is_none());
        assert!(tx.sign_signature.is_none());
        assert_eq!(tx.id, tx.compute_id().unwrap());
    }

    #[test]
    fn empty_vendor_field_is_dropped() {
        let tx = builder()
            .create_transfer(RECIPIENT, 1, Some(""), "s1", None)
            .unwrap();
        assert!(tx.vendor_field.is_none());
    }

    #[test]
    fn strict_policy_rejects_oversize_vendor_field() {
        let memo = "m".repeat(MAX_VENDOR_FIELD_CONTENT + 1);
        let err = builder()
            .create_transfer(RECIPIENT, 1, Some(&memo), "s1", None)
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::VendorFieldOverflow { len: 64, max: 63 }
        ));
        assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
    }

    #[test]
    fn strict_policy_accepts_boundary_vendor_field() {
        let memo = "m".repeat(MAX_VENDOR_FIELD_CONTENT);
        let tx = builder()
            .create_transfer(RECIPIENT, 1, Some(&memo), "s1", None)
            .unwrap();
        assert_eq!(tx.vendor_field.as_deref(), Some(memo.as_str()));
    }

    #[test]
    fn legacy_policy_keeps_oversize_vendor_field_unsigned() {
        let params = NetworkParams::devnet().with_vendor_field_policy(VendorFieldPolicy::Legacy);
        let builder = TransactionBuilder::new(params).at_timestamp(1_000_000);
        let memo = "m".repeat(80);

        let with_memo = builder
            .create_transfer(RECIPIENT, 1, Some(&memo), "s1", None)
            .unwrap();
        let without_memo = builder
            .create_transfer(RECIPIENT, 1, None, "s1", None)
            .unwrap();

        assert_eq!(with_memo.vendor_field.as_deref(), Some(memo.as_str()));
        assert_eq!(with_memo.id, without_memo.id, "oversize memo is not covered");
    }

    #[test]
    fn transfer_with_second_secret() {
        let tx = builder()
            .create_transfer(RECIPIENT, 1, None, "s1", Some("s2"))
            .unwrap();
        assert!(tx.signature.is_some());
        assert!(tx.sign_signature.is_some());
    }

    #[test]
    fn empty_second_secret_is_ignored() {
        let tx = builder()
            .create_transfer(RECIPIENT, 1, None, "s1", Some(""))
            .unwrap();
        assert!(tx.sign_signature.is_none());
    }

    #[test]
    fn malformed_recipient_rejected() {
        let err = builder()
            .create_transfer("DnotAnAddress", 1, None, "s1", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAddress);
    }

    #[test]
    fn empty_secret_rejected() {
        let err = builder()
            .create_transfer(RECIPIENT, 1, None, "", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyDerivation);
    }

    #[test]
    fn second_signature_registration() {
        let tx = builder().create_second_signature("s2", "s1").unwrap();
        let second_pk = ArkKeypair::from_passphrase("s2").unwrap().public_key_hex();
        let sender_pk = ArkKeypair::from_passphrase("s1").unwrap().public_key_hex();

        assert_eq!(tx.tx_type, TransactionType::SecondSignature);
        assert_eq!(tx.amount, 0);
        assert_eq!(tx.fee, SECOND_SIGNATURE_FEE);
        assert_eq!(tx.sender_public_key, sender_pk);
        assert!(tx.recipient_id.is_none());
        assert!(tx.sign_signature.is_none());
        match tx.asset {
            Some(Asset::Signature(ref asset)) => assert_eq!(asset.public_key, second_pk),
            ref other => panic!("expected signature asset, got {:?}", other),
        }
        assert_eq!(tx.id, tx.compute_id().unwrap());
    }

    #[test]
    fn vote_is_self_addressed() {
        let keys = ArkKeypair::from_passphrase("s1").unwrap();
        let votes = vec![format!("+{}", keys.public_key_hex())];
        let tx = builder().create_vote(votes.clone(), "s1", None).unwrap();

        let own_address = address::from_public_key(&keys.public_key(), 0x1e);
        assert_eq!(tx.recipient_id.as_deref(), Some(own_address.as_str()));
        assert_eq!(tx.fee, VOTE_FEE);
        assert_eq!(tx.amount, 0);
        assert_eq!(tx.asset, Some(Asset::Votes(votes)));
    }

    #[test]
    fn vote_address_follows_network() {
        let mainnet = TransactionBuilder::new(NetworkParams::mainnet()).at_timestamp(1);
        let tx = mainnet.create_vote(vec![], "s1", None).unwrap();
        assert!(tx.recipient_id.unwrap().starts_with('A'));
    }

    #[test]
    fn delegate_registration() {
        let tx = builder()
            .create_delegate("genesis_1", "s1", Some("s2"))
            .unwrap();
        assert_eq!(tx.fee, DELEGATE_FEE);
        assert!(tx.sign_signature.is_some());
        match tx.asset {
            Some(Asset::Delegate(ref asset)) => {
                assert_eq!(asset.username, "genesis_1");
                assert_eq!(asset.public_key, tx.sender_public_key);
            }
            ref other => panic!("expected delegate asset, got {:?}", other),
        }
    }

    #[test]
    fn multi_signature_fee_formula() {
        for n in [1usize, 3, 16] {
            let tx = builder()
                .create_multi_signature("s1", None, keysgroup(n), 24, 2)
                .unwrap();
            assert_eq!(tx.fee, (n as u64 + 1) * MULTI_SIGNATURE_UNIT_FEE, "n = {n}");
        }
    }

    #[test]
    fn multi_signature_asset() {
        let group = keysgroup(3);
        let tx = builder()
            .create_multi_signature("s1", Some("s2"), group.clone(), 48, 2)
            .unwrap();
        assert!(tx.sign_signature.is_some());
        assert_eq!(
            tx.asset,
            Some(Asset::MultiSignature(MultiSignatureAsset {
                min: 2,
                lifetime: 48,
                keysgroup: group,
            }))
        );
    }

    #[test]
    fn multi_signature_fee_overflow() {
        let mut params = NetworkParams::devnet();
        params.fees.multi_signature = u64::MAX / 2;
        let builder = TransactionBuilder::new(params).at_timestamp(1);
        let err = builder
            .create_multi_signature("s1", None, keysgroup(2), 24, 2)
            .unwrap_err();
        assert!(matches!(err, TransactionError::FeeOverflow { participants: 3 }));
    }

    #[test]
    fn pinned_timestamp_gives_identical_transactions() {
        let a = builder().create_delegate("same", "s1", None).unwrap();
        let b = builder().create_delegate("same", "s1", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn default_timestamp_tracks_clock() {
        let params = NetworkParams::devnet();
        let before = params.epoch_time_now();
        let tx = TransactionBuilder::new(params.clone())
            .create_delegate("clock", "s1", None)
            .unwrap();
        let after = params.epoch_time_now();
        assert!(tx.timestamp >= before && tx.timestamp <= after);
    }
}
