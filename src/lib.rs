//! Encoding, decoding and cryptography of LoRaWAN 1.0 frames for a network server.
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// This mod needs to go first, so that the others see its macros.
#[macro_use]
mod fmt;
mod macros;

pub mod cmac;
pub mod cursor;
pub mod error;
pub mod header;
pub mod join;
pub mod keys;
pub mod maccommands;
pub mod maccommandset;
pub mod macpayload;
pub mod packet_length;
pub mod phypayload;
pub mod securityhelpers;
pub mod string;
pub mod types;

#[cfg(feature = "default-crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "default-crypto")))]
pub mod default_crypto;

pub use error::{Error, Result};
pub use phypayload::{Payload, PhyPayload};
