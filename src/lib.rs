//! A __crypt__(3) password hashing engine.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! Given a passphrase and a _setting_ string which names a hashing method and
//! its parameters, the engine produces a salted, deliberately expensive hash
//! string. The setting is always a prefix of the result, so a stored hash can
//! be passed back as the setting to verify a passphrase by recomputation.
//!
//! # Getting Started
//!
//! Add the following to the `[dependencies]` section of your `Cargo.toml`:
//!
//! ```toml
//! unixcrypt = "0.1"
//! ```
//!
//! # Examples
//!
//! To verify a password in any supported modular hash format:
//!
//! ```
//! use unixcrypt::unix;
//!
//! let h = "$2y$05$bvIG6Nmid91Mu9RcmmWZfO\
//!          5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe";
//! assert_eq!(unix::verify("password", h), true);
//! ```
//!
//! To hash a password with the preferred method and a fresh salt:
//!
//! ```
//! use unixcrypt::unix;
//!
//! let setting = unix::gensalt(None, 0).unwrap();
//! let h = unix::crypt("password", &setting).unwrap();
//! assert!(unix::verify("password", &h));
//! ```
//!
//! The reentrant interface works with caller-owned buffers and never panics
//! on bad input. On failure the output holds a _failure token_ which can't
//! match any hash:
//!
//! ```
//! use unixcrypt::{unix, CryptData, CryptOutput};
//! use unixcrypt::error::Error;
//!
//! let mut data = CryptData::new();
//! let mut out = CryptOutput::new();
//! assert_eq!(unix::crypt_rn("", "$2$", &mut out, &mut data), Err(Error::InvalidSetting));
//! assert_eq!(out.as_str(), "*0");
//! ```
//!
//! # Summary
//!
//! The methods recognized by the dispatcher, roughly from the strongest:
//! [yescrypt](yescrypt) and [gost-yescrypt](gost_yescrypt) (with an external
//! yescrypt primitive), [Argon2](argon2_crypt), [scrypt](scrypt_crypt),
//! [bcrypt](bcrypt), [SHA-512](sha512_crypt), [SHA-256](sha256_crypt),
//! [HMAC-SHA1](sha1_crypt), [SunMD5](sun_md5), [MD5](md5_crypt),
//! [NT](nthash), [BSDi crypt](bsdi_crypt), [bigcrypt](bigcrypt) and
//! [DES crypt](unix_crypt). New hashes are generated with bcrypt unless
//! another method is requested.
//!
//! Each method is implemented in its own module, and offers three ways of
//! using it:
//!
//! * The `verify` function checks whether the provided hash corresponds to a
//!   password.
//!
//! * The `hash` function hashes a password using the default parameters for the
//!   method and a random salt.
//!
//! * The `hash_with` function allows the caller to customize the hashing
//!   parameters, either with a complete setting string or with a `HashSetup`.
//!
//! The [unix](unix) module provides the __crypt__(3) contract: reentrant and
//! allocating hashing, salt generation, setting checks and the legacy
//! non-reentrant entry point.
//!
//! # Features
//!
//! * `weak-hashes` (default): the dispatcher accepts legacy methods. Without
//!   it, their settings are recognized but refused with `AlgorithmDisabled`.
//!
//! * `argon2`, `scrypt` (default): memory-hard methods built on the RustCrypto
//!   implementations.
//!
//! * `obsolete-api` (default): the DES `setkey`/`encrypt` interface and
//!   `unix::crypt_static`.

#![warn(missing_docs)]

mod enc_dec;
pub mod error;
mod buffer;
mod setting;
mod registry;
pub mod unix;
mod des_tables;
mod des_crypt;
pub mod unix_crypt;
pub mod bigcrypt;
pub mod bsdi_crypt;
#[cfg(feature = "obsolete-api")]
pub mod des_obsolete;
pub mod bcrypt;
pub mod sha1_crypt;
pub mod md5_crypt;
pub mod sun_md5;
pub mod nthash;
mod sha2_crypt;
pub mod sha256_crypt;
pub mod sha512_crypt;
#[cfg(feature = "scrypt")]
pub mod scrypt_crypt;
#[cfg(feature = "argon2")]
pub mod argon2_crypt;
pub mod yescrypt;
pub mod gost_yescrypt;

pub use crate::buffer::{CryptData, CryptOutput};
pub use crate::yescrypt::{YescryptBackend, YescryptParams};

use std::borrow::Cow;

/// Type alias for the Result type.
pub type Result<T> = std::result::Result<T, error::Error>;

/// Setup struct for basic hashing customization.
///
/// Methods which accept a salt take it verbatim, in the method's own
/// encoding. If set to `None`, a random salt will be generated. The usage of
/// `rounds` varies with the method; visit the method's module-level
/// documentation for details. It's always safe to initialize `rounds` to
/// `None`, in which case the suitable default value will be used.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashSetup<'a> {
    /// Custom salt.
    pub salt: Option<&'a str>,
    /// Number of rounds.
    pub rounds: Option<u32>,
}

/// A trait for converting a type into a setting string.
///
/// A `&str` is taken as a complete setting (or an existing hash). A
/// `HashSetup` is turned into a setting by the method-specific function `f`.
pub trait IntoSetting<'a> {
    /// The conversion function.
    fn into_setting(self, f: fn(&HashSetup<'a>) -> Result<String>) -> Result<Cow<'a, str>>;
}

impl<'a> IntoSetting<'a> for &'a str {
    fn into_setting(self, _f: fn(&HashSetup<'a>) -> Result<String>) -> Result<Cow<'a, str>> {
	Ok(Cow::Borrowed(self))
    }
}

impl<'a> IntoSetting<'a> for HashSetup<'a> {
    fn into_setting(self, f: fn(&HashSetup<'a>) -> Result<String>) -> Result<Cow<'a, str>> {
	f(&self).map(Cow::Owned)
    }
}

/// A trait for extracting a NUL-terminated subslice from a slice.
///
/// The original Unix hashing functions expect passwords to be NUL-terminated C strings. This
/// allows values which can't be represented by Rust strings, which are constrained to be UTF-8.
/// On the other hand, Rust strings can contain NUL bytes, and C strings can't.
///
/// The dispatcher in [unix](unix) truncates every passphrase at the first NUL byte, so that
/// hashes agree with those computed by C implementations.
pub trait FindNul {
    /// Subslice extraction function.
    ///
    /// Given a slice, find and return the subslice before the first NUL byte, or the original
    /// slice if no NUL byte is found. Before searching, the slice is converted into a byte
    /// slice, if necessary. The returned slice also consists of raw bytes.
    fn nul_terminated_subslice(&self) -> &[u8];
}

impl FindNul for str {
    fn nul_terminated_subslice(&self) -> &[u8] {
        self.as_bytes().nul_terminated_subslice()
    }
}

impl FindNul for [u8] {
    fn nul_terminated_subslice(&self) -> &[u8] {
        let nul_pos = self.iter().position(|&b| b == 0).unwrap_or(self.len());
        &self[..nul_pos]
    }
}

fn consteq(hash: &str, calchash: Result<String>) -> bool {
    let hstr = match calchash {
	Ok(hstr) => hstr,
	Err(_) => return false,
    };
    if hash.len() != hstr.len() {
	return false;
    }
    0 == hash.bytes().zip(hstr.bytes()).fold(0, |xs, (h1, h2)| xs | h1 ^ h2)
}

mod random {
    use rand::RngCore;
    use rand::rngs::OsRng;
    use zeroize::Zeroizing;
    use crate::error::Error;
    use super::Result;

    pub fn gen_salt_bytes(bytes: &mut [u8]) -> Result<()> {
	OsRng.try_fill_bytes(bytes).map_err(|e| Error::RandomError(e.to_string()))
    }

    /// A buffer of `n` bytes from the system entropy source, wiped on drop.
    pub fn bytes(n: usize) -> Result<Zeroizing<Vec<u8>>> {
	let mut buf = Zeroizing::new(vec![0u8; n]);
	gen_salt_bytes(&mut buf)?;
	Ok(buf)
    }
}

mod parse {
    /// A trait for traversing a hash string.
    ///
    /// Hash strings have internal structure: they consist of a concatenation
    /// of a number of substrings. This trait enables extracting references to
    /// those substrings with the necessary semantics.
    pub trait HashIterator {
	/// The substring that is returned by methods.
	type Elem;

	/// Extract a fixed-size substring.
	///
	/// There must be <i>at least</i> `n` bytes remaining in the string. If
	/// there are less, `None` is returned and the position is unchanged.
	fn take(&mut self, n: usize) -> Option<Self::Elem>;

	/// Returns `true` if the whole string has been consumed.
	fn at_end(&self) -> bool;
    }

    pub struct HashSlice<'a> {
	bp: &'a [u8],
	pos: usize,
    }

    impl<'a> HashSlice<'a> {
	pub fn new(hash: &'a str) -> HashSlice<'a> {
	    HashSlice { bp: hash.as_bytes(), pos: 0 }
	}

	/// Current offset from the start of the string.
	pub fn pos(&self) -> usize {
	    self.pos
	}

	pub fn peek(&self) -> Option<u8> {
	    self.bp.get(self.pos).copied()
	}

	/// The unconsumed remainder.
	pub fn rest(&self) -> &'a [u8] {
	    &self.bp[self.pos..]
	}

	/// Consume `lit` if the remainder starts with it.
	pub fn eat(&mut self, lit: &[u8]) -> bool {
	    if self.rest().starts_with(lit) {
		self.pos += lit.len();
		true
	    } else {
		false
	    }
	}

	/// Consume the longest run of bytes satisfying `pred`.
	pub fn span<F: Fn(u8) -> bool>(&mut self, pred: F) -> &'a [u8] {
	    let sp = self.pos;
	    while self.pos < self.bp.len() && pred(self.bp[self.pos]) {
		self.pos += 1;
	    }
	    &self.bp[sp..self.pos]
	}

	/// Consume a run of decimal digits. The value saturates at `u64::MAX`.
	/// Returns `None` if there are no digits.
	pub fn decimal(&mut self) -> Option<u64> {
	    let digits = self.span(|b| b.is_ascii_digit());
	    if digits.is_empty() {
		return None;
	    }
	    Some(digits.iter().fold(0u64, |acc, &d| acc.saturating_mul(10).saturating_add((d - b'0') as u64)))
	}
    }

    impl<'a> HashIterator for HashSlice<'a> {
	type Elem = &'a [u8];

	fn take(&mut self, n: usize) -> Option<Self::Elem> {
	    let sp = self.pos;
	    if sp + n > self.bp.len() {
		return None;
	    }
	    self.pos += n;
	    Some(&self.bp[sp..self.pos])
	}

	fn at_end(&self) -> bool {
	    self.pos >= self.bp.len()
	}
    }

    #[cfg(test)]
    mod tests {
	use super::{HashSlice, HashIterator};

	#[test]
	fn drain_string() {
	    let mut hs = HashSlice::new("$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe");
	    assert!(hs.eat(b"$2y$"));
	    assert!(!hs.eat(b"$"));
	    assert_eq!(hs.decimal(), Some(5));
	    assert!(hs.eat(b"$"));
	    assert_eq!(hs.take(22).unwrap(), b"bvIG6Nmid91Mu9RcmmWZfO");
	    assert_eq!(hs.pos(), 29);
	    assert_eq!(hs.take(32), None);
	    assert_eq!(hs.span(|b| b != b'$'), b"5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe");
	    assert_eq!(hs.at_end(), true);
	    assert_eq!(hs.take(1), None);
	}

	#[test]
	fn empty_string() {
	    let mut hs = HashSlice::new("");
	    assert_eq!(hs.at_end(), true);
	    assert_eq!(hs.take(0).unwrap(), b"");
	    assert_eq!(hs.peek(), None);
	    assert_eq!(hs.decimal(), None);
	}

	#[test]
	fn saturating_decimal() {
	    let mut hs = HashSlice::new("rounds=99999999999999999999999$salt");
	    assert!(hs.eat(b"rounds="));
	    assert_eq!(hs.decimal(), Some(u64::MAX));
	    assert_eq!(hs.peek(), Some(b'$'));
	    assert_eq!(hs.pos(), 30);
	}
    }
}
