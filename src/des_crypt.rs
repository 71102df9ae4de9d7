// DES block encryption with the salt perturbation used by the crypt family.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use zeroize::{Zeroize, Zeroizing};
use crate::des_tables::{tables, bitmask, ESEL, IP, ROTS};
use crate::enc_dec::{crypt_hash64_encode, encode_val, hash64_index};
use crate::error::Error;
use crate::Result;

/// Salt-dependent tables and the key schedule of one DES computation.
///
/// The 24-bit salt swaps pairs of bits in the expanded half block. Rather than
/// swap them on every round, the swap is folded into the S-box tables, which
/// are patched in place when the salt changes.
pub struct DesState {
    sb: Vec<[u64; 4096]>,
    ks: [u64; 16],
    saltbits: u32,
}

impl DesState {
    pub fn new() -> DesState {
	DesState {
	    sb: tables().sb.to_vec(),
	    ks: [0; 16],
	    saltbits: 0,
	}
    }

    /// Install a salt. Only the low 24 bits are used.
    pub fn set_salt(&mut self, salt: u32) {
	let mut saltbits = 0;
	for i in 0..24 {
	    if salt >> i & 1 != 0 {
		saltbits |= bitmask(i);
	    }
	}
	let delta = (self.saltbits ^ saltbits) as u64;
	if delta == 0 {
	    return;
	}
	log::trace!("patching S-boxes for a new salt");
	for table in self.sb.iter_mut() {
	    for k in table.iter_mut() {
		let x = ((*k >> 32) ^ *k) & delta;
		*k ^= (x << 32) | x;
	    }
	}
	self.saltbits = saltbits;
    }

    /// Compute the key schedule from 8 key bytes. The low bit of each byte
    /// is ignored.
    pub fn set_key(&mut self, key: &[u8; 8]) {
	let t = tables();
	let (mut v1, mut v2) = (0u32, 0u32);
	for (i, &kb) in key.iter().enumerate() {
	    let idx = ((kb >> 1) & 0x7f) as usize;
	    v1 |= t.do_pc1[i][0][idx];
	    v2 |= t.do_pc1[i][1][idx];
	}
	for (i, &r) in ROTS.iter().enumerate() {
	    v1 = ((v1 << r) | (v1 >> (28 - r))) & 0x0fff_ffff;
	    v2 = ((v2 << r) | (v2 >> (28 - r))) & 0x0fff_ffff;
	    let a = t.do_pc2[0][(v1 >> 21 & 0x7f) as usize] | t.do_pc2[1][(v1 >> 14 & 0x7f) as usize]
		| t.do_pc2[2][(v1 >> 7 & 0x7f) as usize] | t.do_pc2[3][(v1 & 0x7f) as usize];
	    let b = t.do_pc2[4][(v2 >> 21 & 0x7f) as usize] | t.do_pc2[5][(v2 >> 14 & 0x7f) as usize]
		| t.do_pc2[6][(v2 >> 7 & 0x7f) as usize] | t.do_pc2[7][(v2 & 0x7f) as usize];
	    self.ks[i] = (a as u64) << 32 | b as u64;
	}
    }

    fn f(&self, x: u64) -> u64 {
	self.sb[3][(x >> 3 & 0xfff) as usize]
	    ^ self.sb[2][(x >> 19 & 0xfff) as usize]
	    ^ self.sb[1][(x >> 35 & 0xfff) as usize]
	    ^ self.sb[0][(x >> 51 & 0xfff) as usize]
    }

    fn salt_swap(&self, a: u32, b: u32) -> (u32, u32) {
	let x = (a ^ b) & self.saltbits;
	(a ^ x, b ^ x)
    }

    /// Encrypt (or decrypt) a block `count` times with the current key and
    /// salt. A zero count is treated as one.
    pub fn crypt_block(&self, input: &[u8; 8], count: u32, decrypt: bool) -> [u8; 8] {
	let bit = |b: usize| (input[b / 8] >> (7 - b % 8)) & 1 != 0;
	let half = |off: usize, start: usize| {
	    let mut v = 0u32;
	    for i in 0..24 {
		if bit(IP[ESEL[start + i] as usize - 1 + off] as usize - 1) {
		    v |= bitmask(i);
		}
	    }
	    v
	};
	let (l1, l2) = self.salt_swap(half(0, 0), half(0, 24));
	let (r1, r2) = self.salt_swap(half(32, 0), half(32, 24));
	let (mut l, mut r) = ((l1 as u64) << 32 | l2 as u64, (r1 as u64) << 32 | r2 as u64);

	let mut ks = self.ks;
	if decrypt {
	    ks.reverse();
	}
	for _ in 0..count.max(1) {
	    for i in 0..8 {
		l ^= self.f(ks[2 * i] ^ r);
		r ^= self.f(ks[2 * i + 1] ^ l);
	    }
	    std::mem::swap(&mut l, &mut r);
	}
	ks.zeroize();

	let (l1, l2) = self.salt_swap((l >> 32) as u32, l as u32);
	let (r1, r2) = self.salt_swap((r >> 32) as u32, r as u32);
	let efp = &tables().efp;
	let (mut v0, mut v1) = (0u32, 0u32);
	for &(w, base) in &[(r2, 12), (r1, 8), (l2, 4), (l1, 0)] {
	    let w = w >> 3;
	    for &(k, sh) in &[(3, 0), (2, 6), (1, 16), (0, 22)] {
		let e = efp[base + k][(w >> sh & 0x3f) as usize];
		v0 |= e[0];
		v1 |= e[1];
	    }
	}
	let mut out = [0u8; 8];
	out[..4].copy_from_slice(&v0.to_be_bytes());
	out[4..].copy_from_slice(&v1.to_be_bytes());
	out
    }

    /// Clear the key schedule.
    pub fn wipe_key(&mut self) {
	self.ks.zeroize();
    }
}

impl Drop for DesState {
    fn drop(&mut self) {
	self.wipe_key();
	self.saltbits.zeroize();
    }
}

/// The 12-bit salt of a traditional hash, from the first two characters
/// of the setting.
pub fn two_char_salt(setting: &[u8]) -> Result<u32> {
    match setting {
	[s0, s1, ..] => {
	    let lo = hash64_index(*s0).ok_or(Error::InvalidSetting)?;
	    let hi = hash64_index(*s1).ok_or(Error::InvalidSetting)?;
	    Ok(lo as u32 | (hi as u32) << 6)
	},
	_ => Err(Error::InvalidSetting),
    }
}

/// Canonical two-character form of a 12-bit salt.
pub fn encode_two_char_salt(salt: u32) -> String {
    encode_val(salt as u64, 2)
}

/// Load up to eight passphrase bytes into a key block, each shifted up by
/// one bit and padded with zeroes.
pub fn key_block(chunk: &[u8]) -> Zeroizing<[u8; 8]> {
    let mut key = Zeroizing::new([0u8; 8]);
    for (k, &b) in key.iter_mut().zip(chunk) {
	*k = b << 1;
    }
    key
}

/// Encrypt a zero block `count` times with the installed key and salt, and
/// encode the result as 11 characters.
pub fn gen_hash(des: &DesState, count: u32) -> String {
    let block = Zeroizing::new(des.crypt_block(&[0u8; 8], count, false));
    crypt_hash64_encode(&block[..])
}
