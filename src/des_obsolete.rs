//! Obsolete DES block cipher interface.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The historical __setkey__(3) and __encrypt__(3) functions expose raw
//! single-block DES with a zero salt. Keys and blocks are passed as
//! 64-byte vectors holding one bit per byte, most significant bit first;
//! only the low bit of each byte is examined. This interface is kept for
//! compatibility and shouldn't be used in new code.
//!
//! # Example
//!
//! ```
//! use unixcrypt::CryptData;
//! use unixcrypt::des_obsolete::{setkey_r, encrypt_r};
//!
//! let mut data = CryptData::new();
//! let key = [0u8; 64];
//! let mut block = [0u8; 64];
//! setkey_r(&key, &mut data);
//! encrypt_r(&mut block, false, &mut data);
//! encrypt_r(&mut block, true, &mut data);
//! assert_eq!(block, [0u8; 64]);
//! ```

use crate::buffer::CryptData;
use crate::unix;

fn pack_bits(bytev: &[u8; 64]) -> [u8; 8] {
    let mut bitv = [0u8; 8];
    for (b, chunk) in bitv.iter_mut().zip(bytev.chunks_exact(8)) {
	*b = chunk.iter().fold(0, |acc, &bit| (acc << 1) | (bit & 1));
    }
    bitv
}

fn unpack_bits(bitv: &[u8; 8], bytev: &mut [u8; 64]) {
    for (i, &b) in bitv.iter().enumerate() {
	for j in 0..8 {
	    bytev[i * 8 + j] = (b >> (7 - j)) & 1;
	}
    }
}

/// Install a DES key in `data`.
///
/// The salt is reset to zero, so that subsequent calls to
/// [`encrypt_r`](fn.encrypt_r.html) compute plain DES.
pub fn setkey_r(key: &[u8; 64], data: &mut CryptData) {
    let bkey = pack_bits(key);
    let des = data.des();
    des.set_salt(0);
    des.set_key(&bkey);
}

/// Encrypt or decrypt one block in place, with the key installed by
/// [`setkey_r`](fn.setkey_r.html).
pub fn encrypt_r(block: &mut [u8; 64], decrypt: bool, data: &mut CryptData) {
    let bin = pack_bits(block);
    let bout = data.des().crypt_block(&bin, 1, decrypt);
    unpack_bits(&bout, block);
}

/// Non-reentrant variant of [`setkey_r`](fn.setkey_r.html).
///
/// # Safety
///
/// The key is kept in process-wide state shared with
/// [`encrypt`](fn.encrypt.html) and
/// [`unix::crypt_static`](../unix/fn.crypt_static.html). No two of these
/// functions may run at the same time.
pub unsafe fn setkey(key: &[u8; 64]) {
    setkey_r(key, &mut unix::legacy_state().data)
}

/// Non-reentrant variant of [`encrypt_r`](fn.encrypt_r.html).
///
/// # Safety
///
/// See [`setkey`](fn.setkey.html).
pub unsafe fn encrypt(block: &mut [u8; 64], decrypt: bool) {
    encrypt_r(block, decrypt, &mut unix::legacy_state().data)
}
