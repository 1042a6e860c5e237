//! Key material and the cryptographic seams of the codec.
//!
//! The codec never talks to a cipher directly: it asks a [`CryptoFactory`] for
//! an [`Encrypter`], [`Decrypter`] or [`Mac`] keyed with an [`AES128`], which
//! keeps the primitives swappable (the software implementation lives in
//! [`crate::default_crypto`]).
use crate::error::Result;
use crate::types::AppNonce;
use rand_core::{CryptoRng, RngCore};

/// [`AES128`] represents 128-bit AES key.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct AES128(pub [u8; 16]);

impl From<[u8; 16]> for AES128 {
    fn from(v: [u8; 16]) -> Self {
        AES128(v)
    }
}

impl AsRef<[u8]> for AES128 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AES128 {
    /// Draws a fresh key from `rng`.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut key = [0; 16];
        rng.try_fill_bytes(&mut key)?;
        Ok(AES128(key))
    }

    /// Draws a fresh key from the operating system RNG.
    pub fn generate() -> Result<Self> {
        Self::random(&mut rand_core::OsRng)
    }
}

macro_rules! lorawan_key {
    (
        $(#[$outer:meta])*
        pub struct $type:ident(AES128);
    ) => {
        $(#[$outer])*
        #[doc = concat!(
            "# Usage\n\n",
            "```\n",
            "use lorawan_codec::keys::", stringify!($type), ";\n",
            "use core::str::FromStr;\n",
            "let key = ", stringify!($type), "::from_str(\"0011 2233 4455 6677 8899 aabb ccdd eeff\").unwrap();\n",
            "assert_eq!(key.as_ref()[15], 0xff);\n",
            "```\n"
        )]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
        pub struct $type(pub(crate) AES128);

        impl $type {
            pub fn inner(&self) -> &AES128 {
                &self.0
            }
        }

        impl From<[u8; 16]> for $type {
            fn from(key: [u8; 16]) -> Self {
                $type(AES128(key))
            }
        }

        impl From<AES128> for $type {
            fn from(key: AES128) -> Self {
                $type(key)
            }
        }

        impl AsRef<[u8]> for $type {
            fn as_ref(&self) -> &[u8] {
                &self.0 .0
            }
        }
    };
}

lorawan_key!(
    /// The [`AppKey`] is the AES-128 root key of an end-device.
    ///
    /// It authenticates the join messages, encrypts the JoinAccept and is the
    /// key both session keys are derived from.
    pub struct AppKey(AES128);
);

lorawan_key!(
    /// The [`AppSKey`] is the application session key: it encrypts FRMPayload
    /// on every port except 0.
    pub struct AppSKey(AES128);
);

lorawan_key!(
    /// The [`NwkSKey`] is the network session key: it computes the MIC of data
    /// frames and encrypts port 0 payloads.
    pub struct NwkSKey(AES128);
);

const NWK_SKEY_PREFIX: u8 = 0x01;
const APP_SKEY_PREFIX: u8 = 0x02;

impl AppKey {
    /// NwkSKey = aes128_encrypt(AppKey, 0x01 | AppNonce | NetID | DevNonce | pad16)
    pub fn derive_nwk_skey<F: CryptoFactory>(
        &self,
        crypto: &F,
        app_nonce: &AppNonce,
        net_id: u32,
        dev_nonce: u16,
    ) -> NwkSKey {
        NwkSKey(self.derive_session_key(crypto, NWK_SKEY_PREFIX, app_nonce, net_id, dev_nonce))
    }

    /// AppSKey = aes128_encrypt(AppKey, 0x02 | AppNonce | NetID | DevNonce | pad16)
    pub fn derive_app_skey<F: CryptoFactory>(
        &self,
        crypto: &F,
        app_nonce: &AppNonce,
        net_id: u32,
        dev_nonce: u16,
    ) -> AppSKey {
        AppSKey(self.derive_session_key(crypto, APP_SKEY_PREFIX, app_nonce, net_id, dev_nonce))
    }

    fn derive_session_key<F: CryptoFactory>(
        &self,
        crypto: &F,
        prefix: u8,
        app_nonce: &AppNonce,
        net_id: u32,
        dev_nonce: u16,
    ) -> AES128 {
        let mut block = [0u8; 16];
        block[0] = prefix;
        block[1..4].copy_from_slice(app_nonce.as_ref());
        // NetID and DevNonce go in most significant byte first.
        block[4..7].copy_from_slice(&net_id.to_be_bytes()[1..]);
        block[7..9].copy_from_slice(&dev_nonce.to_be_bytes());
        crypto.new_enc(&self.0).encrypt_block(&mut block);
        AES128(block)
    }
}

/// Derives the network session key with [`crate::default_crypto::DefaultFactory`].
#[cfg(feature = "default-crypto")]
pub fn nwk_skey_from_nonces(
    app_key: &AppKey,
    app_nonce: &AppNonce,
    net_id: u32,
    dev_nonce: u16,
) -> NwkSKey {
    app_key.derive_nwk_skey(&crate::default_crypto::DefaultFactory, app_nonce, net_id, dev_nonce)
}

/// Derives the application session key with [`crate::default_crypto::DefaultFactory`].
#[cfg(feature = "default-crypto")]
pub fn app_skey_from_nonces(
    app_key: &AppKey,
    app_nonce: &AppNonce,
    net_id: u32,
    dev_nonce: u16,
) -> AppSKey {
    app_key.derive_app_skey(&crate::default_crypto::DefaultFactory, app_nonce, net_id, dev_nonce)
}

/// [`MIC`] represents LoRaWAN message integrity code (MIC).
///
/// On the wire it is the first four bytes of the CMAC tag; read as a
/// little-endian integer it is what [`MIC::to_u32`] returns.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct MIC(pub [u8; 4]);

impl From<[u8; 4]> for MIC {
    fn from(v: [u8; 4]) -> Self {
        MIC(v)
    }
}

impl From<u32> for MIC {
    fn from(v: u32) -> Self {
        MIC(v.to_le_bytes())
    }
}

impl MIC {
    pub fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

/// Trait for implementations of AES128 encryption.
pub trait Encrypter {
    fn encrypt_block(&self, block: &mut [u8]);
}

/// Trait for implementations of AES128 decryption.
pub trait Decrypter {
    fn decrypt_block(&self, block: &mut [u8]);
}

/// Trait for implementations of CMAC (RFC4493).
pub trait Mac {
    fn input(&mut self, data: &[u8]);
    fn reset(&mut self);
    fn result(self) -> [u8; 16];
}

/// Represents an abstraction over the crypto functions.
///
/// This trait provides a way to pick a different implementation of the crypto primitives.
pub trait CryptoFactory {
    type E: Encrypter;
    type D: Decrypter;
    type M: Mac;

    /// Method that creates an Encrypter.
    fn new_enc(&self, key: &AES128) -> Self::E;

    /// Method that creates a Decrypter.
    fn new_dec(&self, key: &AES128) -> Self::D;

    /// Method that creates a MAC calculator.
    fn new_mac(&self, key: &AES128) -> Self::M;
}

#[cfg(all(test, feature = "default-crypto"))]
mod test {
    use super::*;
    use crate::default_crypto::DefaultFactory;
    use core::str::FromStr;
    use rand::SeedableRng;

    fn app_key() -> AppKey {
        AppKey::from_str("0102030405060708 0102030405060708").unwrap()
    }

    #[test]
    fn session_keys_differ_from_root_and_each_other() {
        let app_nonce = AppNonce::from([1, 2, 3]);
        let nwk = app_key().derive_nwk_skey(&DefaultFactory, &app_nonce, 0xAABBCC, 0xabcd);
        let app = app_key().derive_app_skey(&DefaultFactory, &app_nonce, 0xAABBCC, 0xabcd);
        assert_ne!(nwk.inner(), app_key().inner());
        assert_ne!(app.inner(), app_key().inner());
        assert_ne!(nwk.inner(), app.inner());
    }

    #[test]
    fn session_key_is_one_block_encryption() {
        let app_nonce = AppNonce::from([1, 2, 3]);
        let derived = nwk_skey_from_nonces(&app_key(), &app_nonce, 0x00AABBCC, 0xabcd);

        let mut block = [0x01, 1, 2, 3, 0xAA, 0xBB, 0xCC, 0xab, 0xcd, 0, 0, 0, 0, 0, 0, 0];
        DefaultFactory.new_enc(app_key().inner()).encrypt_block(&mut block);
        assert_eq!(derived, NwkSKey::from(block));

        let mut block = [0x02, 1, 2, 3, 0xAA, 0xBB, 0xCC, 0xab, 0xcd, 0, 0, 0, 0, 0, 0, 0];
        DefaultFactory.new_enc(app_key().inner()).encrypt_block(&mut block);
        assert_eq!(app_skey_from_nonces(&app_key(), &app_nonce, 0x00AABBCC, 0xabcd), AppSKey::from(block));
    }

    #[test]
    fn random_keys() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let a = AES128::random(&mut rng).unwrap();
        let b = AES128::random(&mut rng).unwrap();
        assert_ne!(a, b);
        assert!(AES128::generate().is_ok());
    }

    #[test]
    fn mic_is_little_endian() {
        let mic = MIC::from(0x5345CB54);
        assert_eq!(mic.0, [0x54, 0xcb, 0x45, 0x53]);
        assert_eq!(mic.to_u32(), 0x5345CB54);
    }
}
