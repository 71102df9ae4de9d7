//! Scrypt based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The memory-hard scrypt key derivation function in the modular crypt
//! format used by libsodium and yescrypt. The key derivation itself is
//! provided by the RustCrypto `scrypt` crate.
//!
//! # Example
//!
//! ```
//! use unixcrypt::scrypt_crypt;
//!
//! assert_eq!(scrypt_crypt::hash_with("$7$06..../....SodiumChloride", "pleaseletmein").unwrap(),
//!     "$7$06..../....SodiumChloride$ENlyo6fGw4PCcDBOFepfSZjFUnVatHzCcW55.ZGz3B0");
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: unlimited. Generated salts encode 16 random bytes.
//!
//! * __Cost__: N = 2<sup>cost+7</sup> with cost between 6 and 11, r = 32,
//! p = 1 for generated settings. The default cost is 7 (16 MiB). A setting
//! may specify any N from 2<sup>1</sup> to 2<sup>63</sup>, and 30-bit r and p,
//! as long as the computation needs no more than 2 GiB of memory.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$7$`__*`{N}{r}{p}{salt}`*__$__*`{checksum}`*, where:
//!
//! * *`{N}`* is one Base64 character holding log<sub>2</sub>N.
//!
//! * *`{r}`* and *`{p}`* are 5-character little-endian Base64 encodings.
//!
//! * *`{salt}`* is the salt, used as raw text.
//!
//! * *`{checksum}`* is a 43-character Base64 encoding of the 32-byte key.

use scrypt::{scrypt, Params};
use zeroize::Zeroizing;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::enc_dec::{decode_val, encode_val, encode64_le, hash64_index, CRYPT_HASH64};
use crate::error::Error;
use crate::random;

pub(crate) const SCRYPT_MAGIC: &str = "$7$";
pub(crate) const NRBYTES: usize = 16;
const PREFIX_LEN: usize = 3 + 1 + 5 * 2;
const HASH_LEN: usize = 32;
const DEFAULT_COST: u64 = 7;
const MIN_COST: u64 = 6;
const MAX_COST: u64 = 11;
const GENSALT_R: u64 = 32;
const GENSALT_P: u64 = 1;
/// Upper bound on the working memory a setting may ask for, in bytes.
const MAX_MEMORY: u128 = 1 << 31;

fn is_salt_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'/' || b == b'$'
}

/// The salt may be followed by anything after a `$`.
fn verify_salt(setting: &[u8]) -> bool {
    for i in PREFIX_LEN..setting.len() {
	if !is_salt_char(setting[i]) {
	    return setting[i - 1] == b'$';
	}
    }
    true
}

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    let sb = setting.as_bytes();
    if !setting.starts_with(SCRYPT_MAGIC) || sb.len() < PREFIX_LEN || !verify_salt(sb) {
	return Err(Error::InvalidSetting);
    }
    let log_n = hash64_index(sb[3]).ok_or(Error::InvalidSetting)?;
    if !(1..=63).contains(&log_n) {
	return Err(Error::InvalidSetting);
    }
    let r = decode_val(&sb[4..9], 5)?;
    let p = decode_val(&sb[9..14], 5)?;
    if 128 * r as u128 * ((1u128 << log_n) + p as u128) > MAX_MEMORY {
	return Err(Error::InvalidSetting);
    }

    let saltstr = &setting[PREFIX_LEN..];
    let saltstr = match saltstr.rfind('$') {
	Some(pos) => &saltstr[..pos],
	None => saltstr,
    };
    let params = Params::new(log_n, r, p, HASH_LEN).map_err(|_| Error::InvalidSetting)?;
    let mut key = Zeroizing::new([0u8; HASH_LEN]);
    scrypt(pass, saltstr.as_bytes(), &params, &mut key[..]).map_err(|_| Error::InvalidSetting)?;
    Ok(format!("{}${}", &setting[..PREFIX_LEN + saltstr.len()], encode64_le(&key[..])))
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    let count = if count == 0 { DEFAULT_COST } else { count };
    if !(MIN_COST..=MAX_COST).contains(&count) || rbytes.len() < NRBYTES {
	return Err(Error::InvalidArgument);
    }
    Ok(format!("{}{}{}{}{}", SCRYPT_MAGIC, CRYPT_HASH64[(count + 7) as usize] as char,
	encode_val(GENSALT_R, 5), encode_val(GENSALT_P, 5), encode64_le(rbytes)))
}

fn scrypt_setting(param: &HashSetup) -> Result<String> {
    let count = param.rounds.unwrap_or(0) as u64;
    let rbytes = random::bytes(NRBYTES)?;
    let setting = gensalt(count, &rbytes)?;
    Ok(match param.salt {
	Some(salt) => format!("{}{}", &setting[..PREFIX_LEN], salt),
	None => setting,
    })
}

/// Hash a password with a randomly generated salt and the default cost.
///
/// An error is returned if the system random number generator cannot
/// be opened.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    hash_with(HashSetup::default(), pass)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash. If it is a `HashSetup`, the rounds field is taken as the cost
/// (6 to 11), and the salt is used verbatim.
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(scrypt_setting)?)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, hash_with(hash, pass))
}

#[cfg(test)]
mod tests {
    #[test]
    fn published_vectors() {
	assert_eq!(super::hash_with("$7$C6..../....SodiumChloride", "pleaseletmein").unwrap(),
	    "$7$C6..../....SodiumChloride$kBGj9fHznVYFQMEn/qDCfrDevf9YDtcDdKvEqHJLV8D");
	assert_eq!(super::hash_with("$7$06..../....SodiumChloride$", "pleaseletmein").unwrap(),
	    "$7$06..../....SodiumChloride$ENlyo6fGw4PCcDBOFepfSZjFUnVatHzCcW55.ZGz3B0");
	assert!(super::verify("pleaseletmein",
	    "$7$06..../....SodiumChloride$ENlyo6fGw4PCcDBOFepfSZjFUnVatHzCcW55.ZGz3B0"));
    }

    #[test]
    fn generated_setting() {
	let setting = super::gensalt(0, &[0u8; 16]).unwrap();
	assert_eq!(setting, "$7$CU..../..........................");
	assert!(super::gensalt(5, &[0u8; 16]).is_err());
	assert!(super::gensalt(12, &[0u8; 16]).is_err());
	assert!(super::gensalt(6, &[0u8; 15]).is_err());
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn bare_prefix() {
	let _ = super::hash_with("$7$", "test").unwrap();
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn bad_salt_char() {
	let _ = super::hash_with("$7$06..../....Sodium!Chloride", "test").unwrap();
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn excessive_n() {
	let _ = super::hash_with("$7$Z6..../....SodiumChloride", "test").unwrap();
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn excessive_p() {
	let _ = super::hash_with("$7$C6....zzzz.SodiumChloride", "test").unwrap();
    }
}
