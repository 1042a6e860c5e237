//! AES-CMAC (RFC 4493) built on top of any [`Encrypter`].
//!
//! The MAC is computed incrementally: input is buffered one block at a time
//! and a block is only chained once more data shows it is not the last one,
//! since the last block gets the K1/K2 treatment.
use crate::keys::{Encrypter, Mac};

const BLOCK_LEN: usize = 16;
const RB: u8 = 0x87;

/// The CMAC struct represents a CMAC function - a Message Authentication Code using symmetric
/// encryption.
pub struct Cmac<E: Encrypter> {
    cipher: E,
    k1: [u8; BLOCK_LEN],
    k2: [u8; BLOCK_LEN],
    state: [u8; BLOCK_LEN],
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
}

impl<E: Encrypter> core::fmt::Debug for Cmac<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cmac").field("buffered", &self.buffered).finish_non_exhaustive()
    }
}

// K = (L << 1) ^ (msb(L) ? Rb : 0)
fn generate_subkey(l: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
    let mut out = [0; BLOCK_LEN];
    let mut carry = 0;
    for i in (0..BLOCK_LEN).rev() {
        out[i] = (l[i] << 1) | carry;
        carry = l[i] >> 7;
    }
    if l[0] & 0x80 != 0 {
        out[BLOCK_LEN - 1] ^= RB;
    }
    out
}

fn xor_in_place(dst: &mut [u8; BLOCK_LEN], src: &[u8; BLOCK_LEN]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

impl<E: Encrypter> Cmac<E> {
    /// Creates a CMAC calculator; `cipher` must already be keyed.
    pub fn new(cipher: E) -> Self {
        let mut l = [0; BLOCK_LEN];
        cipher.encrypt_block(&mut l);
        let k1 = generate_subkey(&l);
        let k2 = generate_subkey(&k1);
        Cmac { cipher, k1, k2, state: [0; BLOCK_LEN], buffer: [0; BLOCK_LEN], buffered: 0 }
    }

    fn chain_buffer(&mut self) {
        xor_in_place(&mut self.state, &self.buffer);
        self.cipher.encrypt_block(&mut self.state);
        self.buffered = 0;
    }
}

impl<E: Encrypter> Mac for Cmac<E> {
    fn input(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.buffered == BLOCK_LEN {
                self.chain_buffer();
            }
            let n = (BLOCK_LEN - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + n].copy_from_slice(&data[..n]);
            self.buffered += n;
            data = &data[n..];
        }
    }

    fn reset(&mut self) {
        self.state = [0; BLOCK_LEN];
        self.buffered = 0;
    }

    fn result(mut self) -> [u8; 16] {
        let mut last = self.buffer;
        if self.buffered == BLOCK_LEN {
            xor_in_place(&mut last, &self.k1);
        } else {
            last[self.buffered] = 0x80;
            last[self.buffered + 1..].fill(0);
            xor_in_place(&mut last, &self.k2);
        }
        xor_in_place(&mut self.state, &last);
        self.cipher.encrypt_block(&mut self.state);
        self.state
    }
}

/// One-shot CMAC of `data`.
pub fn cmac<E: Encrypter>(cipher: E, data: &[u8]) -> [u8; 16] {
    let mut mac = Cmac::new(cipher);
    mac.input(data);
    mac.result()
}
