//! GOST R 34.11-2012 wrapped yescrypt.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! A [yescrypt](../yescrypt/index.html) hash whose raw result is passed
//! through two layers of HMAC-Streebog-256, for systems which must use
//! certified GOST primitives. The outer key is derived from the Streebog
//! digest of the passphrase and the setting. The yescrypt core comes from
//! the [`YescryptBackend`](../yescrypt/trait.YescryptBackend.html) attached
//! to the scratch state.
//!
//! # Parameters
//!
//! The same as for yescrypt.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$gy$`__*`{params}`*__`$`__*`{salt}`*__`$`__*`{checksum}`*, with the
//! parts encoded as in a yescrypt hash.

use hmac::{Hmac, Mac};
use streebog::{Digest, Streebog256};
use zeroize::Zeroizing;
use crate::enc_dec::{decode64_le, encode64_le};
use crate::error::Error;
use crate::yescrypt::{self, YescryptBackend, YESCRYPT_MAGIC};
use super::Result;

pub(crate) const GOST_YESCRYPT_MAGIC: &str = "$gy$";
pub(crate) const NRBYTES: usize = yescrypt::NRBYTES;
const DIGEST_SIZE: usize = 32;

type HmacStreebog256 = Hmac<Streebog256>;

fn streebog256(data: &[u8]) -> Zeroizing<[u8; DIGEST_SIZE]> {
    let mut out = Zeroizing::new([0u8; DIGEST_SIZE]);
    out.copy_from_slice(&Streebog256::digest(data));
    out
}

fn hmac_streebog256(key: &[u8], data: &[u8]) -> Result<Zeroizing<[u8; DIGEST_SIZE]>> {
    let mut mac = HmacStreebog256::new_from_slice(key).map_err(|_| Error::InvalidArgument)?;
    mac.update(data);
    let mut out = Zeroizing::new([0u8; DIGEST_SIZE]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

pub(crate) fn crypt(pass: &[u8], setting: &str, backend: Option<&dyn YescryptBackend>) -> Result<String> {
    if !setting.starts_with(GOST_YESCRYPT_MAGIC) {
	return Err(Error::InvalidSetting);
    }
    let ysetting = format!("{}{}", YESCRYPT_MAGIC, &setting[GOST_YESCRYPT_MAGIC.len()..]);
    let youtput = yescrypt::crypt(pass, &ysetting, backend)?;
    let hpos = youtput.rfind('$').map(|p| p + 1).ok_or(Error::InvalidSetting)?;
    let y = decode64_le(youtput[hpos..].as_bytes(), yescrypt::HASH_LEN)?;
    if y.len() != yescrypt::HASH_LEN {
	return Err(Error::InvalidSetting);
    }

    // The setting prefix covered by the inner HMAC is as long as the
    // yescrypt prefix, so it stops one byte short of the last '$'.
    let hk = streebog256(pass);
    let interm = hmac_streebog256(&hk[..], &setting.as_bytes()[..hpos.min(setting.len())])?;
    let gy = hmac_streebog256(&interm[..], &y)?;
    Ok(format!("$g{}{}", &youtput[1..hpos], encode64_le(&gy[..])))
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    let mut setting = yescrypt::gensalt(count, rbytes)?;
    setting.insert(1, 'g');
    Ok(setting)
}

/// Hash a password with the given backend and a setting or complete hash.
pub fn hash_with<B: AsRef<[u8]>>(backend: &dyn YescryptBackend, setting: &str, pass: B) -> Result<String> {
    crypt(pass.as_ref(), setting, Some(backend))
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(backend: &dyn YescryptBackend, pass: B, hash: &str) -> bool {
    super::consteq(hash, hash_with(backend, hash, pass))
}
