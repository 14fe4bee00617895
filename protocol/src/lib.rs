// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ARK Protocol: Transaction Engine
//!
//! Client-side construction of ARK v1 transactions: build the record, lay it
//! out in the canonical byte format, sign it with secp256k1 keys derived
//! from a passphrase, and stamp it with a SHA-256 ID. The result is a JSON
//! object ready to hand to a node.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, fee table, and network parameters.
//! - **crypto**: secp256k1 keys, SHA-256/RIPEMD-160, Base58Check addresses.
//! - **transaction**: Records, byte layout, staged signing, builders, verification.
//! - **logging**: Optional `tracing` subscriber setup for binaries and tests.
//!
//! ## Quick Start
//!
//! ```
//! use ark_protocol::config::NetworkParams;
//! use ark_protocol::transaction::{verify_transaction, TransactionBuilder};
//!
//! let builder = TransactionBuilder::new(NetworkParams::devnet());
//! let tx = builder
//!     .create_delegate("genesis_1", "my secret passphrase", None)
//!     .unwrap();
//!
//! verify_transaction(&tx, None).unwrap();
//! println!("{}", tx.to_json());
//! ```
//!
//! Nothing here touches the network. Broadcasting, fee estimation, and
//! nonce management are the caller's business.

pub mod config;
pub mod crypto;
pub mod logging;
pub mod transaction;
