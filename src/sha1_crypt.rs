//! HMAC-SHA1 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! This algorithm was developed for NetBSD. It's a modern
//! algorithm with a large salt and a variable number of rounds.
//! Although the SHA-1 hash, on which it's based, is considered
//! insecure and is being phased out in the PKI environment, its
//! use in a HMAC setup, as is the case here, is still acceptable.
//!
//! # Example
//!
//! ```
//! use unixcrypt::sha1_crypt;
//!
//! assert_eq!(sha1_crypt::hash_with(
//!     "$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a",
//!     "password").unwrap(),
//!     "$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a");
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: 0 to 64 characters. Default is 20. Any character
//! except `$` may appear in the salt; a longer salt is truncated.
//!
//! * __Rounds__: 1 to 2<sup>32</sup>-1. Default is 262144, which
//! is varied downwards by up to a quarter when chosen.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$sha1$`__*`{rounds}`*__$__*`{salt}`*__$__*`{checksum}`*, where:
//!
//! * *`{rounds}`* is the number of rounds, encoded as a decimal number
//!   without leading zeroes.
//!
//! * *`{salt}`* is the salt string.
//!
//! * *`{checksum}`* is a 28-character Base64 encoding of the checksum.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::enc_dec::{sha1crypt_hash64_encode, encode_val};
use crate::error::Error;
use crate::parse::HashSlice;
use crate::random;

/// Default number of rounds.
pub const DEFAULT_ROUNDS: u32 = 262144;
const MIN_ROUNDS: u64 = 4;
const MAX_SALT_LEN: usize = 64;
pub(crate) const SHA1_MAGIC: &str = "$sha1$";
pub(crate) const NRBYTES: usize = 20;

type HmacSha1 = Hmac<Sha1>;

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    let mut hs = HashSlice::new(setting);
    if !hs.eat(SHA1_MAGIC.as_bytes()) {
	return Err(Error::InvalidSetting);
    }
    let rounds = hs.decimal().unwrap_or(0);
    if !hs.eat(b"$") {
	return Err(Error::InvalidSetting);
    }
    let start = hs.pos();
    let salt_len = hs.span(|b| b != b'$').len().min(MAX_SALT_LEN);
    let salt = setting.get(start..start + salt_len).ok_or(Error::InvalidSetting)?;

    let key = HmacSha1::new_from_slice(pass).map_err(|_| Error::InvalidArgument)?;
    let mut hmac = key.clone();
    hmac.update(format!("{}{}{}", salt, SHA1_MAGIC, rounds).as_bytes());
    let mut result = Zeroizing::new([0u8; 20]);
    result.copy_from_slice(&hmac.finalize().into_bytes());
    for _ in 1..rounds {
	let mut hmac = key.clone();
	hmac.update(&result[..]);
	result.copy_from_slice(&hmac.finalize().into_bytes());
    }
    Ok(format!("{}{}${}${}", SHA1_MAGIC, rounds, salt, sha1crypt_hash64_encode(&result)))
}

/// Pick a count in the upper quarter below `count`, using the first four
/// random bytes.
fn vary_rounds(count: u64, rbytes: &[u8]) -> u64 {
    let count = count.clamp(MIN_ROUNDS, u32::MAX as u64);
    let random = u32::from_le_bytes([rbytes[0], rbytes[1], rbytes[2], rbytes[3]]) as u64;
    count - random % (count / 4)
}

fn encode_salt(rbytes: &[u8]) -> String {
    let mut salt = String::with_capacity(MAX_SALT_LEN);
    let mut r = 0;
    while r + 3 < rbytes.len() && salt.len() + 4 < MAX_SALT_LEN {
	let value = (rbytes[r] as u64) << 16 | (rbytes[r + 1] as u64) << 8 | rbytes[r + 2] as u64;
	salt.push_str(&encode_val(value, 4));
	r += 3;
    }
    salt
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    if rbytes.len() < 12 + 4 {
	return Err(Error::InvalidArgument);
    }
    let count = if count == 0 { DEFAULT_ROUNDS as u64 } else { count };
    Ok(format!("{}{}${}$", SHA1_MAGIC, vary_rounds(count, rbytes), encode_salt(&rbytes[4..])))
}

fn sha1_setting(param: &HashSetup) -> Result<String> {
    let rbytes = random::bytes(NRBYTES)?;
    let rounds = match param.rounds {
	Some(0) => return Err(Error::InvalidArgument),
	Some(r) => r as u64,
	None => vary_rounds(DEFAULT_ROUNDS as u64, &rbytes),
    };
    let salt = match param.salt {
	Some(salt) => salt.to_string(),
	None => encode_salt(&rbytes[4..]),
    };
    Ok(format!("{}{}${}$", SHA1_MAGIC, rounds, salt))
}

/// Hash a password with a randomly generated salt and the default
/// number of rounds (varied by a small amount, like on NetBSD).
///
/// An error is returned if the system random number generator cannot
/// be opened.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    hash_with(HashSetup::default(), pass)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash. The number of iterations (rounds) and the salt are parsed out
/// of that value.
/// If the salt is too long, it is truncated to maximum length. A zero
/// rounds value in a `HashSetup` results in an error.
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(sha1_setting)?)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, hash_with(hash, pass))
}

#[cfg(test)]
mod tests {
    use super::HashSetup;

    #[test]
    fn custom() {
	assert_eq!(super::hash_with("$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a", "password").unwrap(),
	    "$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a");
	assert_eq!(super::hash_with(HashSetup { salt: Some("iVdJqfSE"), rounds: Some(19703) }, "password").unwrap(),
	    "$sha1$19703$iVdJqfSE$v4qYKl1zqYThwpjJAoKX6UvlHq/a");
    }

    #[test]
    #[should_panic(expected="value: InvalidArgument")]
    fn bad_rounds() {
	let _ = super::hash_with(HashSetup { salt: Some("K0Ay"), rounds: Some(0) }, "password").unwrap();
    }

    #[test]
    fn salt_up_to_dollar() {
	let hash = super::hash_with("$sha1$1000$a.b-c_d+e=f$", "password").unwrap();
	assert!(hash.starts_with("$sha1$1000$a.b-c_d+e=f$"));
	assert_eq!(super::hash_with(&hash[..], "password").unwrap(), hash);
	let empty = super::hash_with("$sha1$1000$$", "password").unwrap();
	assert!(empty.starts_with("$sha1$1000$$"));
	assert!(super::verify("password", &empty));
    }

    #[test]
    fn long_salt_truncated() {
	let long = format!("$sha1$4${}$", "x".repeat(80));
	let hash = super::hash_with(&long[..], "password").unwrap();
	assert_eq!(hash, super::hash_with(&long[..8 + 64], "password").unwrap());
	assert_eq!(hash.len(), 8 + 64 + 1 + 28);
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn rounds_not_terminated() {
	let _ = super::hash_with("$sha1$1000salt$", "password").unwrap();
    }

    #[test]
    fn generated_setting() {
	let mut rbytes = [0u8; 20];
	rbytes[..4].copy_from_slice(&7u32.to_le_bytes());
	assert_eq!(super::gensalt(0, &rbytes).unwrap(), "$sha1$262137$....................$");
	assert_eq!(super::gensalt(1, &rbytes).unwrap(), "$sha1$4$....................$");
	assert!(super::gensalt(0, &rbytes[..15]).is_err());
    }
}
