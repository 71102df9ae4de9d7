//! Seventh Edition Unix DES-based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The first Unix password hash: 25 DES encryptions of a zero block, keyed
//! with the passphrase and perturbed by a 12-bit salt. Selected by the
//! dispatcher for a setting which begins with two crypt alphabet
//! characters. Kept for reading old password files only.
//!
//! # Example
//!
//! ```
//! use unixcrypt::unix_crypt;
//!
//! assert!(unix_crypt::verify("password", "xOAFZqRz5RduI"));
//! ```
//!
//! # Parameters
//!
//! Only the first eight passphrase bytes count, and of each byte only the
//! low seven bits. The salt is two characters, and the count is fixed.
//!
//! # Hash Format
//!
//! *`{salt}`*_`{checksum}`_: two salt characters followed by eleven
//! checksum characters, both in the crypt alphabet.

use super::{Result, consteq};
use crate::des_crypt::{DesState, two_char_salt, encode_two_char_salt, key_block, gen_hash};
use crate::enc_dec::CRYPT_HASH64;
use crate::error::Error;
use crate::random;

/// Salt length.
pub const SALT_LEN: usize = 2;
const ROUNDS: u32 = 25;

pub(crate) fn crypt(pass: &[u8], setting: &str, des: &mut DesState) -> Result<String> {
    let salt = two_char_salt(setting.as_bytes())?;
    let key = key_block(&pass[..pass.len().min(8)]);
    des.set_key(&key);
    des.set_salt(salt);
    Ok(encode_two_char_salt(salt) + &gen_hash(des, ROUNDS))
}

/// Salt generation, shared with bigcrypt. The count must be 0 or 25.
pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    if rbytes.len() < SALT_LEN || (count != 0 && count != ROUNDS as u64) {
	return Err(Error::InvalidArgument);
    }
    Ok(rbytes[..SALT_LEN].iter().map(|&b| CRYPT_HASH64[(b & 0x3f) as usize] as char).collect())
}

/// Hash a password with a randomly generated salt.
///
/// An error is returned if the system random number generator cannot
/// be opened.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    let saltstr = gensalt(0, &random::bytes(SALT_LEN)?)?;
    crypt(pass.as_ref(), &saltstr, &mut DesState::new())
}

/// Hash a password with a user-provided salt.
///
/// An error is returned if the salt is too short or contains an invalid
/// character.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash_with<B: AsRef<[u8]>>(salt: &str, pass: B) -> Result<String> {
    crypt(pass.as_ref(), salt, &mut DesState::new())
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash, &mut DesState::new()))
}
