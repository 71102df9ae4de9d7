//! Argon2 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! Argon2, the winner of the Password Hashing Competition, in the PHC
//! string format. All three standard variants are supported; the
//! computation is provided by the RustCrypto `argon2` crate.
//!
//! # Example
//!
//! ```
//! use unixcrypt::argon2_crypt;
//!
//! assert!(argon2_crypt::verify("password",
//!     "$argon2id$v=19$m=256,t=2,p=1$c29tZXNhbHQ$nf65EOgLrQMR/uIPnA4rEsF5h7TKyQwu9U1bMCHGi/4"));
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: 8 to 64 bytes. Default is 16.
//!
//! * __Cost__: memory in KiB (`m`, at most 2 GiB), passes (`t`) and lanes (`p`).
//! Generated settings use 4096 KiB, one lane, and 3 passes unless another
//! count is requested.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$`__*`{variant}`*__`$v=`__*`{version}`*__`$m=`__*`{m}`*__`,t=`__*`{t}`*__`,p=`__*`{p}`*__`$`__*`{salt}`*__`$`__*`{checksum}`*,
//! where:
//!
//! * *`{variant}`* is one of **argon2d**, **argon2i** or **argon2id**.
//!
//! * *`{version}`* is 16 or 19. The whole __`v=`__ part may be omitted, which
//!   selects version 16.
//!
//! * *`{m}`*, *`{t}`* and *`{p}`* are decimal numbers without leading zeroes.
//!
//! * *`{salt}`* and *`{checksum}`* are standard Base64 encodings without
//!   padding. The checksum is always 32 bytes long.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::enc_dec::{base64_decode, base64_encode};
use crate::error::Error;
use crate::parse::HashSlice;
use crate::random;

pub(crate) const ARGON2D_MAGIC: &str = "$argon2d$";
pub(crate) const ARGON2I_MAGIC: &str = "$argon2i$";
pub(crate) const ARGON2ID_MAGIC: &str = "$argon2id$";
pub(crate) const NRBYTES: usize = 16;
const MIN_SETTING_LEN: usize = 26;
const MIN_SALT_LEN: usize = 8;
const MAX_SALT_LEN: usize = 64;
const HASH_LEN: usize = 32;
const DEFAULT_PASSES: u64 = 3;
const GENSALT_MEMORY: u32 = 4096;
/// Upper bound on `m`, in KiB (2 GiB).
const MAX_MEMORY: u32 = 1 << 21;

fn magic(alg: Algorithm) -> &'static str {
    match alg {
	Algorithm::Argon2d => ARGON2D_MAGIC,
	Algorithm::Argon2i => ARGON2I_MAGIC,
	Algorithm::Argon2id => ARGON2ID_MAGIC,
    }
}

fn algorithm_of(setting: &str) -> Option<Algorithm> {
    [Algorithm::Argon2d, Algorithm::Argon2i, Algorithm::Argon2id].iter()
	.copied()
	.find(|&alg| setting.starts_with(magic(alg)))
}

/// A `name=value` pair with a non-zero value that fits in 32 bits and has
/// no leading zeroes, followed by `end`.
fn get_value(hs: &mut HashSlice, name: &[u8], end: u8) -> Result<u32> {
    if !hs.eat(name) || !matches!(hs.peek(), Some(b'1'..=b'9')) {
	return Err(Error::InvalidSetting);
    }
    let value = hs.decimal().and_then(|v| u32::try_from(v).ok()).ok_or(Error::InvalidSetting)?;
    if !hs.eat(&[end]) {
	return Err(Error::InvalidSetting);
    }
    Ok(value)
}

pub(crate) fn crypt(alg: Algorithm, pass: &[u8], setting: &str) -> Result<String> {
    if setting.len() < MIN_SETTING_LEN || !setting.starts_with(magic(alg)) {
	return Err(Error::InvalidSetting);
    }
    let mut hs = HashSlice::new(setting);
    hs.eat(magic(alg).as_bytes());
    let version = if hs.rest().starts_with(b"v=") {
	get_value(&mut hs, b"v=", b'$')?
    } else {
	0x10
    };
    let version = Version::try_from(version).map_err(|_| Error::InvalidSetting)?;
    let m = get_value(&mut hs, b"m=", b',')?;
    if m > MAX_MEMORY {
	return Err(Error::InvalidSetting);
    }
    let t = get_value(&mut hs, b"t=", b',')?;
    let p = get_value(&mut hs, b"p=", b'$')?;
    let salt_start = hs.pos();
    let salt_enc = hs.span(|b| b != b'$');
    let salt = base64_decode(salt_enc)?;

    let params = Params::new(m, t, p, Some(HASH_LEN)).map_err(|_| Error::InvalidSetting)?;
    let mut tag = Zeroizing::new([0u8; HASH_LEN]);
    Argon2::new(alg, version, params)
	.hash_password_into(pass, &salt, &mut tag[..])
	.map_err(|_| Error::InvalidSetting)?;
    Ok(format!("{}${}", &setting[..salt_start + salt_enc.len()], base64_encode(&tag[..])))
}

pub(crate) fn gensalt(alg: Algorithm, count: u64, rbytes: &[u8]) -> Result<String> {
    let count = if count == 0 { DEFAULT_PASSES } else { count };
    if count > u32::MAX as u64 || rbytes.len() < MIN_SALT_LEN || rbytes.len() > MAX_SALT_LEN {
	return Err(Error::InvalidArgument);
    }
    Ok(format!("{}v=19$m={},t={},p=1${}$", magic(alg), GENSALT_MEMORY, count, base64_encode(rbytes)))
}

fn argon2_setting(param: &HashSetup) -> Result<String> {
    let count = param.rounds.unwrap_or(0) as u64;
    match param.salt {
	Some(salt) => {
	    let count = if count == 0 { DEFAULT_PASSES } else { count };
	    Ok(format!("{}v=19$m={},t={},p=1${}$", ARGON2ID_MAGIC, GENSALT_MEMORY, count, salt))
	},
	None => gensalt(Algorithm::Argon2id, count, &random::bytes(NRBYTES)?),
    }
}

/// Hash a password with a randomly generated salt and the default
/// parameters, using Argon2id.
///
/// An error is returned if the system random number generator cannot
/// be opened.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    hash_with(HashSetup::default(), pass)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash of any of the three variants. A `HashSetup` produces an Argon2id
/// setting, where the rounds field gives the number of passes and the salt
/// must be in standard Base64 without padding.
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    let setting = param.into_setting(argon2_setting)?;
    let alg = algorithm_of(&setting).ok_or(Error::InvalidSetting)?;
    crypt(alg, pass.as_ref(), &setting)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, hash_with(hash, pass))
}
