//! BSDi extended DES hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The hashing algorithm used by BSD/OS, also supported on other *BSDs.
//! It is based on DES like the original Unix algorithm, but folds the
//! whole passphrase into the key and has a larger salt and a variable
//! number of rounds. It is still weak, and should be used for backward
//! compatibility only.
//!
//! # Example
//!
//! ```
//! use unixcrypt::bsdi_crypt;
//!
//! assert_eq!(bsdi_crypt::verify("password", "_Gl/.K0Ay.aosctsbJ1k"), true);
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: 4 characters (24 bits).
//!
//! * __Rounds__: 1 to 2<sup>24</sup>-1. Default is 725. Even counts
//! are accepted when hashing, but never generated.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`_`__*`{rounds}{salt}{checksum}`*, where:
//!
//! * *`{rounds}`* is a 4-character Base64 encoding of the number of rounds.
//!
//! * *`{salt}`* is a 4-character Base64 encoding of the salt.
//!
//! * *`{checksum}`* is a 11-character Base64 encoding of the checksum.

use super::{Result, HashSetup, IntoSetting, consteq};
use crate::des_crypt::{DesState, key_block, gen_hash};
use crate::enc_dec::{decode_val, encode_val};
use crate::error::Error;
use crate::parse::{HashSlice, HashIterator};
use crate::random;
use zeroize::Zeroizing;

const MIN_ROUNDS: u32 = 1;
const MAX_ROUNDS: u32 = (1 << 24) - 1;
/// Default number of rounds.
pub const DEFAULT_ROUNDS: u32 = 725;
/// Salt length.
pub const SALT_LEN: usize = 4;
const ROUNDS_LEN: usize = 4;
pub(crate) const NRBYTES: usize = 3;

pub(crate) fn crypt(pass: &[u8], setting: &str, des: &mut DesState) -> Result<String> {
    let mut hs = HashSlice::new(setting);
    if !hs.eat(b"_") {
	return Err(Error::InvalidSetting);
    }
    let rounds = decode_val(hs.take(ROUNDS_LEN).ok_or(Error::InvalidSetting)?, ROUNDS_LEN)?;
    let salt = decode_val(hs.take(SALT_LEN).ok_or(Error::InvalidSetting)?, SALT_LEN)?;

    des.set_salt(0);
    let mut chunks = pass.chunks(8);
    let mut prev = Zeroizing::new([0u8; 8]);
    loop {
	let mut key = key_block(chunks.next().unwrap_or(&[]));
	for (k, p) in key.iter_mut().zip(prev.iter()) {
	    *k ^= p;
	}
	des.set_key(&key);
	if chunks.len() == 0 {
	    break;
	}
	*prev = des.crypt_block(&key, 1, false);
    }
    des.set_salt(salt);
    Ok(format!("{}{}", &setting[..1 + ROUNDS_LEN + SALT_LEN], gen_hash(des, rounds)))
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    let count = if count == 0 { DEFAULT_ROUNDS as u64 } else { count };
    if rbytes.len() < NRBYTES || count > MAX_ROUNDS as u64 || count % 2 == 0 {
	return Err(Error::InvalidArgument);
    }
    let value = rbytes[0] as u64 | (rbytes[1] as u64) << 8 | (rbytes[2] as u64) << 16;
    Ok(format!("_{}{}", encode_val(count, ROUNDS_LEN), encode_val(value, SALT_LEN)))
}

fn bsdi_setting(param: &HashSetup) -> Result<String> {
    let rounds = param.rounds.unwrap_or(DEFAULT_ROUNDS);
    if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
	return Err(Error::InvalidArgument);
    }
    match param.salt {
	Some(salt) => Ok(format!("_{}{}", encode_val(rounds as u64, ROUNDS_LEN), salt)),
	None => {
	    let rbytes = random::bytes(NRBYTES)?;
	    let value = rbytes[0] as u64 | (rbytes[1] as u64) << 8 | (rbytes[2] as u64) << 16;
	    Ok(format!("_{}{}", encode_val(rounds as u64, ROUNDS_LEN), encode_val(value, SALT_LEN)))
	},
    }
}

/// Hash a password with a randomly generated salt and the default
/// number of rounds.
///
/// An error is returned if the system random number generator cannot
/// be opened.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    crypt(pass.as_ref(), &bsdi_setting(&HashSetup::default())?, &mut DesState::new())
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be in the final hash
/// format. The number of rounds and the salt are parsed out of that value.
/// An error is returned if the salt is too short or contains an invalid
/// character. An out-of-range rounds value in a `HashSetup` will also
/// result in an error.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(bsdi_setting)?, &mut DesState::new())
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash, &mut DesState::new()))
}
