//! SHA-256 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! SHA-crypt with a 256-bit digest, recognized by the `$5$` prefix. It
//! shares the stretching procedure with [SHA-512](../sha512_crypt/index.html),
//! and differs only in the digest and the final byte shuffle.
//!
//! # Example
//!
//! ```
//! use unixcrypt::sha256_crypt;
//!
//! let h = "$5$rounds=11858$WH1ABM5sKhxbkgCK$\
//!          aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1";
//! assert_eq!(sha256_crypt::hash_with(h, "test").unwrap(), h);
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: up to 16 characters; a longer salt in a setting is
//!   cut, not rejected. Generated settings carry 16.
//!
//! * __Rounds__: 1000 to 999999999, default 5000. Values out of range are
//!   clamped, and the clamped value is what appears in the hash.
//!
//! # Hash Format
//!
//! __`$5$`__\[__`rounds=`__*`{rounds}`*__`$`__\]*`{salt}`*__`$`__*`{checksum}`*,
//! where the `rounds=` part is present only if it was in the setting, and
//! *`{checksum}`* is 43 characters of the crypt alphabet.

use sha2::Sha256;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::setting;
use crate::sha2_crypt::{sha2_crypt, sha2_setting, LIMITS};

pub use crate::sha2_crypt::MIN_ROUNDS;
pub use crate::sha2_crypt::MAX_ROUNDS;
pub use crate::sha2_crypt::DEFAULT_ROUNDS;
pub use crate::sha2_crypt::MAX_SALT_LEN;

pub(crate) const SHA256_MAGIC: &str = "$5$";
const SHA256_TRANSPOSE: &[u8] = b"\x14\x0a\x00\x0b\x01\x15\x02\x16\x0c\x17\x0d\x03\x0e\x04\x18\x05\
				  \x19\x0f\x1a\x10\x06\x11\x07\x1b\x08\x1c\x12\x1d\x13\x09\x1e\x1f";

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    sha2_crypt::<Sha256>(pass, setting, SHA256_TRANSPOSE, SHA256_MAGIC)
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    setting::gensalt(SHA256_MAGIC, MAX_SALT_LEN, &LIMITS, count, rbytes)
}

fn sha256_setting(param: &HashSetup) -> Result<String> {
    sha2_setting(param, SHA256_MAGIC)
}

/// Hash a password with a randomly generated salt and the default
/// number of rounds.
///
/// An error is returned if the system random number generator cannot
/// be opened.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    hash_with(HashSetup::default(), pass)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash. The number of rounds and the salt are parsed out of that value.
/// If the salt is too long, it is truncated to maximum length. If it contains
/// an invalid character, an error is returned. An out-of-range rounds value
/// will be coerced into the allowed range.
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(sha256_setting)?)
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
	assert_eq!(super::hash_with(
		   "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1", "test").unwrap(),
	    "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1");
	assert_eq!(super::hash_with(HashSetup { salt: Some("WH1ABM5sKhxbkgCK"), rounds: Some(11858) }, "test").unwrap(),
	    "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1");
    }

    #[test]
    fn implicit_dflt_rounds() {
	assert_eq!(super::hash_with(
		   "$5$WH1ABM5sKhxbkgCK$sOnTVjQn1Y3EWibd8gWqqJqjH.KaFrxJE5rijqxcPp7", "test").unwrap(),
	    "$5$WH1ABM5sKhxbkgCK$sOnTVjQn1Y3EWibd8gWqqJqjH.KaFrxJE5rijqxcPp7");
	assert_eq!(super::hash_with("$5$saltstring", "Hello world!").unwrap(),
	    "$5$saltstring$5B8vYYiY.CVt1RlTTf8KbXBH3hsxY/GNooZaBBGWEc5");
    }

    #[test]
    fn rounds_too_low() {
	assert_eq!(super::hash_with("$5$rounds=10$roundstoolow", "the minimum number is still observed").unwrap(),
	    "$5$rounds=1000$roundstoolow$yfvwcWrQ8l/K0DAWyuPMDNHpIVlTQebY9l/gL972bIC");
    }

    #[test]
    fn random_salt() {
	let h = super::hash("password").unwrap();
	assert!(h.starts_with("$5$"));
	assert_eq!(h.len(), 3 + 16 + 1 + 43);
	assert!(super::verify("password", &h));
	assert!(!super::verify("Password", &h));
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn bad_salt_char() {
	let _ = super::hash_with("$5$salt!$", "test").unwrap();
    }
}
