//! SHA-512 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The SHA-512 member of the SHA-crypt family, and the strongest of the
//! digest-stretching methods. It's widely deployed as the default system
//! hash on Linux distributions.
//!
//! # Example
//!
//! ```
//! use unixcrypt::sha512_crypt;
//!
//! let h =
//!     "$6$G/gkPn17kHYo0gTF$xhDFU0QYExdMH2ghOWKrrVtu1BuTpNMSJ\
//!      URCXk43.EYekmK8iwV6RNqftUUC8mqDel1J7m3JEbUkbu4YyqSyv/";
//! assert_eq!(sha512_crypt::hash_with(h, "test").unwrap(), h);
//! ```
//!
//! # Parameters
//!
//! The same as for [SHA-256](../sha256_crypt/index.html): a salt of up to
//! 16 characters, and 1000 to 999999999 clamped rounds with a default of
//! 5000.
//!
//! # Hash Format
//!
//! __`$6$`__\[__`rounds=`__*`{rounds}`*__`$`__\]*`{salt}`*__`$`__*`{checksum}`*,
//! with an 86-character checksum.

use sha2::Sha512;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::setting;
use crate::sha2_crypt::{sha2_crypt, sha2_setting, LIMITS};

pub use crate::sha2_crypt::MIN_ROUNDS;
pub use crate::sha2_crypt::MAX_ROUNDS;
pub use crate::sha2_crypt::DEFAULT_ROUNDS;
pub use crate::sha2_crypt::MAX_SALT_LEN;

pub(crate) const SHA512_MAGIC: &str = "$6$";
const SHA512_TRANSPOSE: &[u8] = b"\x2a\x15\x00\x01\x2b\x16\x17\x02\x2c\x2d\x18\x03\x04\x2e\x19\x1a\
				  \x05\x2f\x30\x1b\x06\x07\x31\x1c\x1d\x08\x32\x33\x1e\x09\x0a\x34\
				  \x1f\x20\x0b\x35\x36\x21\x0c\x0d\x37\x22\x23\x0e\x38\x39\x24\x0f\
				  \x10\x3a\x25\x26\x11\x3b\x3c\x27\x12\x13\x3d\x28\x29\x14\x3e\x3f";

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    sha2_crypt::<Sha512>(pass, setting, SHA512_TRANSPOSE, SHA512_MAGIC)
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    setting::gensalt(SHA512_MAGIC, MAX_SALT_LEN, &LIMITS, count, rbytes)
}

fn sha512_setting(param: &HashSetup) -> Result<String> {
    sha2_setting(param, SHA512_MAGIC)
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
    crypt(pass.as_ref(), &param.into_setting(sha512_setting)?)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, hash_with(hash, pass))
}
