//! Provides a default software implementation for LoRaWAN's cryptographic functions.
use super::keys::*;
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

pub type Cmac = crate::cmac::Cmac<Aes128>;

/// Provides a default implementation for build object for using the crypto functions.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultFactory;

impl CryptoFactory for DefaultFactory {
    type E = Aes128;
    type D = Aes128;
    type M = Cmac;

    fn new_enc(&self, key: &AES128) -> Self::E {
        Aes128::new(GenericArray::from_slice(&key.0[..]))
    }

    fn new_dec(&self, key: &AES128) -> Self::D {
        Aes128::new(GenericArray::from_slice(&key.0[..]))
    }

    fn new_mac(&self, key: &AES128) -> Self::M {
        Cmac::new(self.new_enc(key))
    }
}

impl Encrypter for Aes128 {
    fn encrypt_block(&self, block: &mut [u8]) {
        BlockEncrypt::encrypt_block(self, GenericArray::from_mut_slice(block));
    }
}

impl Decrypter for Aes128 {
    fn decrypt_block(&self, block: &mut [u8]) {
        BlockDecrypt::decrypt_block(self, GenericArray::from_mut_slice(block));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matches_cmac_crate() {
        use cmac::Mac as _;
        let key = AES128([
            0xE0, 0x01, 0x2A, 0x22, 0x25, 0xB8, 0x58, 0x5E, 0xDC, 0xEC, 0x70, 0x42, 0x47, 0x98,
            0xC5, 0x10,
        ]);
        let data: Vec<u8> = (0u8..=80).collect();
        for len in [0, 1, 15, 16, 17, 32, 81] {
            let mut ours = DefaultFactory.new_mac(&key);
            ours.input(&data[..len]);

            let mut theirs = <cmac::Cmac<Aes128> as KeyInit>::new_from_slice(&key.0).unwrap();
            theirs.update(&data[..len]);
            let expected: [u8; 16] = theirs.finalize().into_bytes().into();
            assert_eq!(ours.result(), expected);
        }
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let key = AES128([7; 16]);
        let mut block = *b"sixteen byte blk";
        Encrypter::encrypt_block(&DefaultFactory.new_enc(&key), &mut block);
        assert_ne!(&block, b"sixteen byte blk");
        Decrypter::decrypt_block(&DefaultFactory.new_dec(&key), &mut block);
        assert_eq!(&block, b"sixteen byte blk");
    }
}
