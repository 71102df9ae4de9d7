//! The __crypt__(3) interface.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The functions in this module recognize the hashing method from the
//! setting string and route the call to it. The reentrant functions,
//! [`crypt_rn`](fn.crypt_rn.html) and [`gensalt_rn`](fn.gensalt_rn.html),
//! work with caller-provided buffers and signal errors both ways: the
//! returned `Result` carries the cause, and the output buffer holds a
//! _failure token_, which never matches a valid hash or the setting it was
//! computed from. Code which only compares strings thus fails safely.
//!
//! Before dispatch, the passphrase is cut at the first NUL byte, and
//! rejected if it's 512 bytes or longer. Settings must consist of printable
//! ASCII characters other than `!`, `*`, `:`, `;` and `\`. A setting which
//! begins with `$` but names no known method is always an error; it is
//! never hashed with DES.

use super::{Result, consteq, FindNul};
use crate::buffer::{CryptData, CryptOutput};
use crate::error::Error;
use crate::random;
use crate::registry::{self, Method};
#[cfg(feature = "obsolete-api")]
use std::cell::UnsafeCell;

/// Size of the output buffer, in bytes.
pub const CRYPT_OUTPUT_SIZE: usize = 384;
/// Maximum size of a generated setting, in bytes.
pub const CRYPT_GENSALT_OUTPUT_SIZE: usize = 192;
/// Passphrases must be shorter than this.
pub const CRYPT_MAX_PASSPHRASE_SIZE: usize = 512;

/// Result of a setting check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltStatus {
    /// The setting is usable for new hashes.
    Ok,
    /// The method is supported, but too weak for new hashes.
    Legacy,
    /// The method is recognized, but not available in this build.
    Disabled,
    /// The setting is malformed or names no known method.
    Invalid,
}

fn bad_setting_chars(setting: &str) -> bool {
    setting.bytes().any(|b| b <= 0x20 || b >= 0x7f || b"!*:;\\".contains(&b))
}

fn select(setting: &str) -> Result<Method> {
    if bad_setting_chars(setting) {
	return Err(Error::InvalidSetting);
    }
    registry::find(setting).ok_or(Error::InvalidSetting)
}

fn do_crypt(phrase: &[u8], setting: &str, data: &mut CryptData) -> Result<String> {
    let phrase = phrase.nul_terminated_subslice();
    if phrase.len() >= CRYPT_MAX_PASSPHRASE_SIZE {
	return Err(Error::PassphraseTooLong);
    }
    let method = select(setting)?;
    log::debug!("hashing with {}", method);
    let mut scratch = data.scratch();
    method.crypt(phrase, setting, &mut scratch)
}

/// Hash a passphrase into a caller-provided buffer.
///
/// The output is set to the failure token before any other work, and
/// replaced by the hash only when it has been fully computed and fits in
/// the buffer. The key-dependent parts of `data` are wiped before
/// returning, whatever the outcome. A `data` which is reused for
/// subsequent calls keeps its DES tables.
pub fn crypt_rn<B: AsRef<[u8]>>(phrase: B, setting: &str, out: &mut CryptOutput, data: &mut CryptData) -> Result<()> {
    out.fail(setting);
    let res = do_crypt(phrase.as_ref(), setting, data).and_then(|hash| out.fill(&hash));
    if let Err(ref e) = res {
	log::debug!("crypt failed: {:?}", e);
    }
    res
}

/// Hash a passphrase, allocating the scratch state and the result.
///
/// On failure, the error is returned instead of a failure token.
pub fn crypt<B: AsRef<[u8]>>(phrase: B, setting: &str) -> Result<String> {
    let mut data = CryptData::new();
    let mut out = CryptOutput::new();
    crypt_rn(phrase, setting, &mut out, &mut data)?;
    Ok(out.as_str().to_string())
}

/// Verify that the hash corresponds to a passphrase, using hash format
/// recognition.
pub fn verify<B: AsRef<[u8]>>(phrase: B, hash: &str) -> bool {
    consteq(hash, crypt(phrase, hash))
}

/// Generate a setting into a caller-provided buffer.
///
/// `prefix` selects the method the same way a setting does; `None` selects
/// the [preferred method](fn.preferred_method.html), and `Some("")`
/// selects DES. A `count` of zero means the method's default cost. If
/// `rbytes` is `None`, the method's usual number of random bytes is read
/// from the operating system.
pub fn gensalt_rn(prefix: Option<&str>, count: u64, rbytes: Option<&[u8]>, out: &mut CryptOutput) -> Result<()> {
    out.fail("");
    if out.capacity() < 3 {
	log::debug!("gensalt failed: {:?}", Error::BufferTooSmall);
	return Err(Error::BufferTooSmall);
    }
    let res = do_gensalt(prefix, count, rbytes).and_then(|setting| {
	if setting.len() + 1 > CRYPT_GENSALT_OUTPUT_SIZE {
	    return Err(Error::BufferTooSmall);
	}
	out.fill(&setting)
    });
    if let Err(ref e) = res {
	log::debug!("gensalt failed: {:?}", e);
    }
    res
}

fn do_gensalt(prefix: Option<&str>, count: u64, rbytes: Option<&[u8]>) -> Result<String> {
    let method = match prefix {
	Some(prefix) => registry::find(prefix).ok_or(Error::InvalidArgument)?,
	None => registry::PREFERRED,
    };
    log::debug!("generating setting for {}", method);
    match rbytes {
	Some(rbytes) => method.gensalt(count, rbytes),
	None => method.gensalt(count, &random::bytes(method.nrbytes())?),
    }
}

/// Generate a setting with random bytes from the operating system.
///
/// See [`gensalt_rn`](fn.gensalt_rn.html) for the meaning of the arguments.
pub fn gensalt(prefix: Option<&str>, count: u64) -> Result<String> {
    let mut out = CryptOutput::with_capacity(CRYPT_GENSALT_OUTPUT_SIZE);
    gensalt_rn(prefix, count, None, &mut out)?;
    Ok(out.as_str().to_string())
}

/// Check whether a setting, or an existing hash, may be used.
///
/// Only the method is examined; `Ok` doesn't guarantee that hashing with
/// the setting will succeed.
pub fn checksalt(setting: &str) -> SaltStatus {
    if setting.is_empty() {
	return SaltStatus::Invalid;
    }
    match select(setting) {
	Err(_) => SaltStatus::Invalid,
	Ok(m) if !m.enabled() => SaltStatus::Disabled,
	Ok(m) if !m.is_strong() => SaltStatus::Legacy,
	Ok(_) => SaltStatus::Ok,
    }
}

/// The prefix of the method used for new hashes when none is specified.
pub fn preferred_method() -> &'static str {
    registry::PREFERRED.prefix()
}

#[cfg(feature = "obsolete-api")]
pub(crate) struct LegacyState {
    pub data: CryptData,
    pub out: CryptOutput,
}

#[cfg(feature = "obsolete-api")]
struct LegacyCell(UnsafeCell<Option<LegacyState>>);

// Access goes through unsafe functions whose callers guarantee exclusion.
#[cfg(feature = "obsolete-api")]
unsafe impl Sync for LegacyCell {}

#[cfg(feature = "obsolete-api")]
static LEGACY: LegacyCell = LegacyCell(UnsafeCell::new(None));

/// The process-wide state of the non-reentrant functions.
///
/// # Safety
///
/// The caller must ensure that no other reference obtained from this
/// function is alive.
#[cfg(feature = "obsolete-api")]
pub(crate) unsafe fn legacy_state() -> &'static mut LegacyState {
    (*LEGACY.0.get()).get_or_insert_with(|| LegacyState { data: CryptData::new(), out: CryptOutput::new() })
}

/// Non-reentrant variant of [`crypt_rn`](fn.crypt_rn.html).
///
/// The result, or the failure token, is stored in a process-wide buffer
/// and returned from there. Use [`crypt`](fn.crypt.html) or `crypt_rn` in
/// new code.
///
/// # Safety
///
/// The buffer and the scratch state are shared with all other calls of
/// this function and with the `setkey`/`encrypt` functions in
/// [`des_obsolete`](../des_obsolete/index.html). None of them may run
/// concurrently, and the returned value is overwritten by the next call.
#[cfg(feature = "obsolete-api")]
pub unsafe fn crypt_static<B: AsRef<[u8]>>(phrase: B, setting: &str) -> &'static str {
    let state = legacy_state();
    let _ = crypt_rn(phrase, setting, &mut state.out, &mut state.data);
    state.out.as_str()
}

#[cfg(test)]
mod tests {
    use super::{SaltStatus, checksalt, gensalt_rn, crypt_rn, preferred_method};
    use crate::buffer::{CryptData, CryptOutput};
    use crate::error::Error;

    #[test]
    #[cfg(feature = "weak-hashes")]
    fn crypt_recognized() {
	for &(pass, hash) in &[
	    ("password", "_Gl/.K0Ay.aosctsbJ1k"),
	    ("password", "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0"),
	    ("password", "$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe"),
	    ("test", "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1"),
	    ("test", "aZGJuE6EXrjEE"),
	] {
	    assert_eq!(super::crypt(pass, hash).unwrap(), hash);
	    assert!(super::verify(pass, hash));
	}
    }

    #[test]
    fn failure_token_in_output() {
	let mut data = CryptData::new();
	let mut out = CryptOutput::new();
	assert_eq!(crypt_rn("", "$2$", &mut out, &mut data), Err(Error::InvalidSetting));
	assert_eq!(out.as_str(), "*0");
	assert_eq!(crypt_rn("", "*0", &mut out, &mut data), Err(Error::InvalidSetting));
	assert_eq!(out.as_str(), "*1");
	assert_eq!(crypt_rn("", "$1$ab:c$", &mut out, &mut data), Err(Error::InvalidSetting));
	assert_eq!(crypt_rn("", "$1$ab c$", &mut out, &mut data), Err(Error::InvalidSetting));
	assert_eq!(crypt_rn("", "\u{e9}b", &mut out, &mut data), Err(Error::InvalidSetting));
    }

    #[test]
    fn unknown_prefix_not_des() {
	assert_eq!(super::crypt("password", "$9$ab"), Err(Error::InvalidSetting));
	assert_eq!(super::crypt("password", "a"), Err(Error::InvalidSetting));
    }

    #[test]
    #[cfg(feature = "weak-hashes")]
    fn passphrase_limits() {
	let long = vec![b'x'; 512];
	assert_eq!(super::crypt(&long, "ab"), Err(Error::PassphraseTooLong));
	assert!(super::crypt(&long[..511], "ab").is_ok());
	assert_eq!(super::crypt("test\0ignored", "aZ").unwrap(), "aZGJuE6EXrjEE");
    }

    #[test]
    #[cfg(feature = "weak-hashes")]
    fn short_output_buffer() {
	let mut data = CryptData::new();
	let mut out = CryptOutput::with_capacity(13);
	assert_eq!(crypt_rn("test", "aZ", &mut out, &mut data), Err(Error::BufferTooSmall));
	assert_eq!(out.as_str(), "*0");
	let mut out = CryptOutput::with_capacity(14);
	assert_eq!(crypt_rn("test", "aZ", &mut out, &mut data), Ok(()));
	assert_eq!(out.as_str(), "aZGJuE6EXrjEE");
    }

    #[test]
    #[cfg(feature = "weak-hashes")]
    fn generated_settings() {
	let mut out = CryptOutput::new();
	gensalt_rn(Some("$5$"), 0, Some(&[0u8; 15]), &mut out).unwrap();
	assert_eq!(out.as_str(), "$5$................");
	gensalt_rn(Some(""), 0, Some(&[0u8; 2]), &mut out).unwrap();
	assert_eq!(out.as_str(), "..");
	gensalt_rn(None, 0, Some(&[0u8; 16]), &mut out).unwrap();
	assert_eq!(out.as_str(), "$2b$05$......................");
	assert_eq!(gensalt_rn(Some("$9$"), 0, None, &mut out), Err(Error::InvalidArgument));
	assert_eq!(out.as_str(), "*0");
	assert_eq!(gensalt_rn(Some("$2b$"), 3, Some(&[0u8; 16]), &mut out), Err(Error::InvalidArgument));
	assert_eq!(gensalt_rn(Some("$6$"), 1_000_000_000, Some(&[0u8; 15]), &mut out), Err(Error::InvalidArgument));
	if cfg!(feature = "weak-hashes") {
	    assert_eq!(gensalt_rn(Some("$1$"), 7, Some(&[0u8; 9]), &mut out), Err(Error::InvalidArgument));
	    assert_eq!(out.as_str(), "*0");
	}
	let mut tiny = CryptOutput::with_capacity(2);
	assert_eq!(gensalt_rn(None, 0, None, &mut tiny), Err(Error::BufferTooSmall));
	let setting = super::gensalt(Some("$6$"), 10000).unwrap();
	assert!(setting.starts_with("$6$rounds=10000$"));
	assert_eq!(checksalt(&setting), SaltStatus::Ok);
    }

    #[test]
    #[cfg(feature = "weak-hashes")]
    fn salt_status() {
	assert_eq!(checksalt(""), SaltStatus::Invalid);
	assert_eq!(checksalt("$2b$05$"), SaltStatus::Ok);
	assert_eq!(checksalt("$2x$05$"), SaltStatus::Legacy);
	assert_eq!(checksalt("$1$abc$"), SaltStatus::Legacy);
	assert_eq!(checksalt("ab"), SaltStatus::Legacy);
	assert_eq!(checksalt("$argon2ds$"), SaltStatus::Disabled);
	assert_eq!(checksalt("$2$"), SaltStatus::Invalid);
	assert_eq!(checksalt("$1$a*b$"), SaltStatus::Invalid);
	assert_eq!(preferred_method(), "$2b$");
    }
}
