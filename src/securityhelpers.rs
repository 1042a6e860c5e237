//! MIC calculation and payload ciphers.
use crate::keys::{AppKey, CryptoFactory, Decrypter, Encrypter, Mac, AES128, MIC};
use crate::maccommands::Direction;
use crate::types::DevAddr;

const B0_PREFIX: u8 = 0x49;
const A_PREFIX: u8 = 0x01;

/// Builds the B0/A_i block shared by the data MIC and the FRMPayload cipher.
/// The last byte is left for the caller.
fn generate_helper_block(first: u8, direction: Direction, dev_addr: DevAddr, fcnt: u16) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[0] = first;
    // block[1..5] are 0
    block[5] = u8::from(!direction.is_uplink());
    block[6..10].copy_from_slice(&dev_addr.to_u32().to_le_bytes());
    // only the 16-bit counter; the upper half stays zero
    block[10..14].copy_from_slice(&u32::from(fcnt).to_le_bytes());
    // block[14] is 0
    block
}

fn calculate_mic_with_header<M: Mac>(header: &[u8], data: &[u8], mut mac: M) -> MIC {
    mac.input(header);
    mac.input(data);
    let result = mac.result();

    let mut mic = [0u8; 4];
    mic.copy_from_slice(&result[0..4]);
    MIC(mic)
}

/// MIC of a data frame. `data` is MHDR | FHDR | FPort | FRMPayload, without the MIC.
pub fn calculate_data_mic<F: CryptoFactory>(
    factory: &F,
    key: &AES128,
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u16,
    data: &[u8],
) -> MIC {
    let mut b0 = generate_helper_block(B0_PREFIX, direction, dev_addr, fcnt);
    b0[15] = data.len() as u8;
    calculate_mic_with_header(&b0, data, factory.new_mac(key))
}

/// MIC of a join message: the plain CMAC over MHDR and body.
pub fn calculate_join_mic<F: CryptoFactory>(factory: &F, key: &AppKey, data: &[u8]) -> MIC {
    calculate_mic_with_header(&[], data, factory.new_mac(key.inner()))
}

/// Applies the FRMPayload keystream in place. Encryption and decryption are
/// the same operation.
pub fn encrypt_frm_data_payload<F: CryptoFactory>(
    factory: &F,
    key: &AES128,
    direction: Direction,
    dev_addr: DevAddr,
    fcnt: u16,
    payload: &mut [u8],
) {
    let aes_enc = factory.new_enc(key);
    let mut a = generate_helper_block(A_PREFIX, direction, dev_addr, fcnt);
    for (i, chunk) in payload.chunks_mut(16).enumerate() {
        a[15] = (i + 1) as u8;
        let mut s = a;
        aes_enc.encrypt_block(&mut s);
        chunk.iter_mut().zip(s).for_each(|(b, k)| *b ^= k);
    }
}

/// Network server side of the JoinAccept cipher: the AES decrypt primitive
/// runs over every 16-byte block. `data` must be a whole number of blocks.
pub fn encrypt_join_accept<F: CryptoFactory>(factory: &F, key: &AppKey, data: &mut [u8]) {
    let aes_dec = factory.new_dec(key.inner());
    data.chunks_exact_mut(16).for_each(|block| aes_dec.decrypt_block(block));
}

/// End device side of the JoinAccept cipher, undoing [`encrypt_join_accept`]
/// with the AES encrypt primitive.
pub fn decrypt_join_accept<F: CryptoFactory>(factory: &F, key: &AppKey, data: &mut [u8]) {
    let aes_enc = factory.new_enc(key.inner());
    data.chunks_exact_mut(16).for_each(|block| aes_enc.encrypt_block(block));
}
