//! MD5 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The FreeBSD `$1$` hash, which replaced DES crypt in the nineties and
//! was for a long time the default on Linux. A thousand fixed rounds of
//! MD5 make it cheap to attack; use it for old hashes only.
//!
//! # Example
//!
//! ```
//! use unixcrypt::md5_crypt;
//!
//! assert!(md5_crypt::verify("password", "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0"));
//! ```
//!
//! # Parameters
//!
//! The salt is at most 8 characters; anything beyond is ignored. Generated
//! settings use the full 8. There is no cost parameter; salt generation
//! accepts only a count of zero or 1000.
//!
//! # Hash Format
//!
//! __`$1$`__*`{salt}`*__`$`__*`{checksum}`*, with a 22-character checksum.

use md5::{Md5, Digest};
use zeroize::Zeroizing;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::enc_dec::encode64_le;
use crate::setting::{self, RoundsLimits};

/// Maximium salt length.
pub const MAX_SALT_LEN: usize = 8;
pub(crate) const MD5_MAGIC: &str = "$1$";
const MD5_TRANSPOSE: &[u8] = b"\x0c\x06\x00\x0d\x07\x01\x0e\x08\x02\x0f\x09\x03\x05\x0a\x04\x0b";
const ROUNDS: RoundsLimits = RoundsLimits { default: 1000, min: 1000, max: 1000 };

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    let parsed = setting::parse(setting, MD5_MAGIC, false, MAX_SALT_LEN)?;
    let salt = parsed.salt;

    let mut dgst_b = Md5::new();
    dgst_b.update(pass);
    dgst_b.update(salt.as_bytes());
    dgst_b.update(pass);
    let mut hash_b = Zeroizing::new([0u8; 16]);
    hash_b.copy_from_slice(&dgst_b.finalize());

    let mut dgst_a = Md5::new();
    dgst_a.update(pass);
    dgst_a.update(MD5_MAGIC.as_bytes());
    dgst_a.update(salt.as_bytes());

    for chunk in pass.chunks(16) {
	dgst_a.update(&hash_b[..chunk.len()]);
    }

    let mut plen = pass.len();
    while plen > 0 {
	match plen & 1 {
	    0 => dgst_a.update(&pass[..1]),
	    _ => dgst_a.update([0u8]),
	}
	plen >>= 1;
    }

    let mut hash_a = Zeroizing::new([0u8; 16]);
    hash_a.copy_from_slice(&dgst_a.finalize());

    for r in 0..ROUNDS.default {
	let mut dgst_a = Md5::new();
	if r % 2 == 1 {
	    dgst_a.update(pass);
	} else {
	    dgst_a.update(&hash_a[..]);
	}
	if r % 3 > 0 {
	    dgst_a.update(salt.as_bytes());
	}
	if r % 7 > 0 {
	    dgst_a.update(pass);
	}
	if r % 2 == 0 {
	    dgst_a.update(pass);
	} else {
	    dgst_a.update(&hash_a[..]);
	}
	hash_a.copy_from_slice(&dgst_a.finalize());
    }

    let mut transposed = Zeroizing::new([0u8; 16]);
    for (i, &ti) in MD5_TRANSPOSE.iter().enumerate() {
	transposed[i] = hash_a[ti as usize];
    }
    Ok(format!("{}${}", &setting[..parsed.span], encode64_le(&transposed[..])))
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    setting::gensalt(MD5_MAGIC, MAX_SALT_LEN, &ROUNDS, count, rbytes)
}

fn md5_setting(param: &HashSetup) -> Result<String> {
    match param.salt {
	Some(salt) => Ok(format!("{}{}", MD5_MAGIC, salt)),
	None => gensalt(0, &crate::random::bytes(6)?),
    }
}

/// Hash a password with a randomly generated salt.
///
/// An error is returned if the system random number generator cannot
/// be opened.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    crypt(pass.as_ref(), &md5_setting(&HashSetup::default())?)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash. The salt is parsed out of that value.
/// If the salt is too long, it is truncated to maximum length. If it contains
/// an invalid character, an error is returned. The rounds field of a
/// `HashSetup` is ignored.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(md5_setting)?)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash))
}

#[cfg(test)]
mod tests {
    use super::HashSetup;

    #[test]
    #[allow(deprecated)]
    fn custom() {
	assert_eq!(super::hash_with("$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0", "password").unwrap(),
	    "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0");
	assert_eq!(super::hash_with(HashSetup { salt: Some("5pZSV9va"), rounds: None }, "password").unwrap(),
	    "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0");
    }

    #[test]
    #[allow(deprecated)]
    fn salt_only_setting() {
	assert_eq!(super::hash_with("$1$abc$", "abc").unwrap(), "$1$abc$czj10a8hEuHoKfs5PmF8//");
    }

    #[test]
    #[allow(deprecated)]
    fn random_salt() {
	let h = super::hash("password").unwrap();
	assert_eq!(h.len(), 3 + 8 + 1 + 22);
	assert!(super::verify("password", &h));
    }

    #[test]
    fn generated_setting() {
	assert_eq!(super::gensalt(0, &[0u8; 6]).unwrap(), "$1$........");
	assert_eq!(super::gensalt(1000, &[0u8; 6]).unwrap(), "$1$........");
    }

    #[test]
    #[should_panic(expected="value: InvalidArgument")]
    fn cost_is_fixed() {
	let _ = super::gensalt(7, &[0u8; 6]).unwrap();
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected="value: InvalidSetting")]
    fn colon_in_salt() {
	let _ = super::hash_with("$1$ab:cd$", "password").unwrap();
    }
}
