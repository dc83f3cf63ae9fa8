use aes::{
    Aes128,
    cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray},
};

use crate::{
    hal::layouts::{AES_BLOCK_SIZE, ArgumentError},
    implementation::cpu_ref::write_truncated,
};

type Block = [u8; AES_BLOCK_SIZE];

/// AES-XCBC-MAC (RFC 3566): a CBC-MAC under the derived key K1 whose last
/// block is masked with K2 when complete, or padded and masked with K3.
///
/// The last block seen is held back in `pending` until more input arrives.
pub struct XcbcLane {
    k1: Aes128,
    k2: Block,
    k3: Block,
    mac: Block,
    pending: Block,
    pending_len: usize,
}

impl XcbcLane {
    pub fn new(key: &[u8]) -> Result<Self, ArgumentError> {
        let cipher: Aes128 = Aes128::new_from_slice(key).map_err(|_| ArgumentError::KeyLength {
            got: key.len(),
            expected: "16",
        })?;
        let derive = |byte: u8| -> Block {
            let mut block: Block = [byte; AES_BLOCK_SIZE];
            cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
            block
        };
        Ok(Self {
            k1: Aes128::new(&derive(0x01).into()),
            k2: derive(0x02),
            k3: derive(0x03),
            mac: [0u8; AES_BLOCK_SIZE],
            pending: [0u8; AES_BLOCK_SIZE],
            pending_len: 0,
        })
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.pending_len == AES_BLOCK_SIZE {
                self.absorb();
            }
            let take: usize = (AES_BLOCK_SIZE - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];
        }
    }

    pub fn finalize_into(mut self, out: &mut [u8]) {
        let mask: Block = if self.pending_len == AES_BLOCK_SIZE {
            self.k2
        } else {
            self.pending[self.pending_len] = 0x80;
            self.pending[self.pending_len + 1..].fill(0);
            self.k3
        };
        self.pending.iter_mut().zip(mask.iter()).for_each(|(p, m)| *p ^= m);
        self.absorb();
        write_truncated(&self.mac, out);
    }

    fn absorb(&mut self) {
        self.mac
            .iter_mut()
            .zip(self.pending.iter())
            .for_each(|(m, p)| *m ^= p);
        self.k1.encrypt_block(GenericArray::from_mut_slice(&mut self.mac));
        self.pending_len = 0;
    }
}
