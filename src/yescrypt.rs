//! Yescrypt setting format.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! Yescrypt is the default password hashing method of several Linux
//! distributions. This crate parses and generates yescrypt settings and
//! formats the results, while the memory-hard core is supplied by the
//! application through the [`YescryptBackend`](trait.YescryptBackend.html)
//! trait and attached to a [`CryptData`](../struct.CryptData.html). Without
//! a backend, yescrypt and gost-yescrypt hashes fail with
//! `AlgorithmDisabled`.
//!
//! # Example
//!
//! ```
//! use unixcrypt::{unix, CryptData, CryptOutput, YescryptBackend, YescryptParams};
//! use unixcrypt::error::Error;
//!
//! struct Fake;
//!
//! impl YescryptBackend for Fake {
//!     fn derive(&self, _: &[u8], _: &[u8], params: &YescryptParams, out: &mut [u8]) -> unixcrypt::Result<()> {
//!         assert_eq!((params.n, params.r), (4096, 32));
//!         out.iter_mut().for_each(|b| *b = 0);
//!         Ok(())
//!     }
//! }
//!
//! let mut data = CryptData::new().with_yescrypt(Fake);
//! let mut out = CryptOutput::new();
//! unix::crypt_rn("pleaseletmein", "$y$j9T$.......", &mut out, &mut data).unwrap();
//! assert_eq!(out.as_str(), "$y$j9T$.......$...........................................");
//! assert_eq!(unix::crypt("pleaseletmein", "$y$j9T$......."), Err(Error::AlgorithmDisabled));
//! ```
//!
//! # Parameters
//!
//! * __Salt length__: up to 64 bytes. Generated salts have 16 bytes.
//!
//! * __Cost__: 1 to 11, default 5. Costs below 3 select r = 8 and
//! N = 2<sup>cost+9</sup>; higher costs select r = 32 and
//! N = 2<sup>cost+7</sup>.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$y$`__*`{params}`*__`$`__*`{salt}`*__`$`__*`{checksum}`*, where:
//!
//! * *`{params}`* holds the flavor, log<sub>2</sub>N and r, optionally
//!   followed by a bit mask and the p, t, g and log<sub>2</sub>NROM values it
//!   announces, all in yescrypt's variable-length Base64 integer encoding.
//!
//! * *`{salt}`* is the salt in little-endian Base64.
//!
//! * *`{checksum}`* is a 43-character Base64 encoding of the 32-byte key.

use zeroize::Zeroizing;
use crate::enc_dec::{decode64_le, decode_u32, encode64_le, encode_u32};
use crate::error::Error;
use super::Result;

pub(crate) const YESCRYPT_MAGIC: &str = "$y$";
pub(crate) const NRBYTES: usize = 16;
/// Size of the derived key.
pub const HASH_LEN: usize = 32;
const MAX_SALT_LEN: usize = 64;
const DEFAULT_COST: u64 = 5;
const MAX_COST: u64 = 11;
/// The flavor of generated settings, with the read-write mode and default
/// S-box layout.
const FLAVOR_DEFAULT: u32 = 47;
const YESCRYPT_RW: u32 = 2;
const RW_FLAVOR_MAX: u32 = YESCRYPT_RW + (0x3fffffc >> 2);

/// The parameters of a yescrypt computation, as decoded from a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YescryptParams {
    /// Mode and flavor flags.
    pub flags: u32,
    /// Block count.
    pub n: u64,
    /// Block size, in units of 128 bytes.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
    /// Additional time factor.
    pub t: u32,
    /// Hash upgrade count.
    pub g: u32,
    /// ROM size, zero if unused.
    pub nrom: u64,
}

impl Default for YescryptParams {
    fn default() -> Self {
	YescryptParams { flags: 0, n: 0, r: 0, p: 1, t: 0, g: 0, nrom: 0 }
    }
}

/// The memory-hard yescrypt key derivation.
///
/// Implementations compute the raw key for the given passphrase, binary
/// salt and parameters into `out`, which is `HASH_LEN` bytes long. An error
/// is reported to the caller of the hashing function unchanged.
pub trait YescryptBackend: Send + Sync {
    /// Derive the key.
    fn derive(&self, passwd: &[u8], salt: &[u8], params: &YescryptParams, out: &mut [u8]) -> Result<()>;
}

/// A decoded `$y$` setting.
pub(crate) struct Setting<'a> {
    pub params: YescryptParams,
    /// Everything up to the hash, without the separating `$`.
    pub prefix: &'a str,
    pub salt: Zeroizing<Vec<u8>>,
}

fn next_u32(enc: &[u8], pos: &mut usize, min: u32) -> Result<u32> {
    let (value, used) = decode_u32(&enc[*pos..], min)?;
    *pos += used;
    Ok(value)
}

fn log2_value(log2: u32) -> Result<u64> {
    if log2 > 63 {
	return Err(Error::InvalidSetting);
    }
    Ok(1u64 << log2)
}

pub(crate) fn parse_setting(setting: &str) -> Result<Setting<'_>> {
    if !setting.starts_with(YESCRYPT_MAGIC) {
	return Err(Error::InvalidSetting);
    }
    let sb = setting.as_bytes();
    let mut pos = YESCRYPT_MAGIC.len();
    let mut params = YescryptParams::default();

    let flavor = next_u32(sb, &mut pos, 0)?;
    params.flags = if flavor < YESCRYPT_RW {
	flavor
    } else if flavor <= RW_FLAVOR_MAX {
	YESCRYPT_RW + ((flavor - YESCRYPT_RW) << 2)
    } else {
	return Err(Error::InvalidSetting);
    };
    params.n = log2_value(next_u32(sb, &mut pos, 1)?)?;
    params.r = next_u32(sb, &mut pos, 1)?;
    if sb.get(pos) != Some(&b'$') {
	let have = next_u32(sb, &mut pos, 1)?;
	if have & 1 != 0 {
	    params.p = next_u32(sb, &mut pos, 2)?;
	}
	if have & 2 != 0 {
	    params.t = next_u32(sb, &mut pos, 1)?;
	}
	if have & 4 != 0 {
	    params.g = next_u32(sb, &mut pos, 1)?;
	}
	if have & 8 != 0 {
	    params.nrom = log2_value(next_u32(sb, &mut pos, 1)?)?;
	}
    }
    if sb.get(pos) != Some(&b'$') {
	return Err(Error::InvalidSetting);
    }
    pos += 1;

    let saltstr = &setting[pos..];
    let saltstr = match saltstr.rfind('$') {
	Some(end) => &saltstr[..end],
	None => saltstr,
    };
    let salt = Zeroizing::new(decode64_le(saltstr.as_bytes(), MAX_SALT_LEN)?);
    Ok(Setting { params, prefix: &setting[..pos + saltstr.len()], salt })
}

/// Run the backend over a parsed setting.
pub(crate) fn derive(backend: &dyn YescryptBackend, pass: &[u8], setting: &Setting) -> Result<Zeroizing<[u8; HASH_LEN]>> {
    let mut key = Zeroizing::new([0u8; HASH_LEN]);
    backend.derive(pass, &setting.salt, &setting.params, &mut key[..])?;
    Ok(key)
}

pub(crate) fn crypt(pass: &[u8], setting: &str, backend: Option<&dyn YescryptBackend>) -> Result<String> {
    let parsed = parse_setting(setting)?;
    let backend = backend.ok_or(Error::AlgorithmDisabled)?;
    let key = derive(backend, pass, &parsed)?;
    Ok(format!("{}${}", parsed.prefix, encode64_le(&key[..])))
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    let count = if count == 0 { DEFAULT_COST } else { count };
    if count > MAX_COST || rbytes.len() < NRBYTES {
	return Err(Error::InvalidArgument);
    }
    let (n_log2, r) = if count < 3 { (count + 9, 8) } else { (count + 7, 32) };
    Ok(format!("{}{}{}{}${}", YESCRYPT_MAGIC,
	encode_u32(FLAVOR_DEFAULT, 0)?,
	encode_u32(n_log2 as u32, 1)?,
	encode_u32(r, 1)?,
	encode64_le(rbytes)))
}

/// Hash a password with the given backend and a setting or complete hash.
pub fn hash_with<B: AsRef<[u8]>>(backend: &dyn YescryptBackend, setting: &str, pass: B) -> Result<String> {
    crypt(pass.as_ref(), setting, Some(backend))
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(backend: &dyn YescryptBackend, pass: B, hash: &str) -> bool {
    super::consteq(hash, hash_with(backend, hash, pass))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{YescryptBackend, YescryptParams};
    use crate::error::Error;
    use crate::Result;
    use streebog::{Digest, Streebog256};

    /// Stands in for the real primitive; mixes in every input.
    pub struct Mixer;

    impl YescryptBackend for Mixer {
	fn derive(&self, passwd: &[u8], salt: &[u8], params: &YescryptParams, out: &mut [u8]) -> Result<()> {
	    let mut st = Streebog256::new();
	    st.update(passwd);
	    st.update(salt);
	    st.update(format!("{:?}", params).as_bytes());
	    out.copy_from_slice(&st.finalize()[..]);
	    Ok(())
	}
    }

    #[test]
    fn parse_defaults() {
	let s = super::parse_setting("$y$j9T$LdJMENpBABJJ3hIHjB1Bi.$").unwrap();
	assert_eq!(s.params, YescryptParams { flags: 0xb6, n: 4096, r: 32, p: 1, t: 0, g: 0, nrom: 0 });
	assert_eq!(s.prefix, "$y$j9T$LdJMENpBABJJ3hIHjB1Bi.");
	assert_eq!(s.salt.len(), 16);
    }

    #[test]
    fn parse_optional_params() {
	let s = super::parse_setting("$y$jD5.7$LdJMENpBABJJ3hIHjB1Bi.").unwrap();
	assert_eq!((s.params.n, s.params.r, s.params.p, s.params.t), (1 << 16, 8, 11, 0));
	assert_eq!(s.prefix, "$y$jD5.7$LdJMENpBABJJ3hIHjB1Bi.");
	assert!(super::parse_setting("$y$j9T.$").is_err());
	assert!(super::parse_setting("$y$j9T").is_err());
	assert!(super::parse_setting("$y$j9T$x").is_err());
    }

    #[test]
    fn generated_setting() {
	assert_eq!(super::gensalt(0, &[0u8; 16]).unwrap(), "$y$j9T$......................");
	assert_eq!(super::gensalt(1, &[0u8; 16]).unwrap(), "$y$j75$......................");
	assert_eq!(super::gensalt(11, &[0u8; 16]).unwrap(), "$y$jFT$......................");
	assert_eq!(super::gensalt(12, &[0u8; 16]), Err(Error::InvalidArgument));
	assert_eq!(super::gensalt(5, &[0u8; 15]), Err(Error::InvalidArgument));
    }

    #[test]
    fn backend_result_formatting() {
	let h = super::hash_with(&Mixer, "$y$j9T$LdJMENpBABJJ3hIHjB1Bi.", "pleaseletmein").unwrap();
	assert!(h.starts_with("$y$j9T$LdJMENpBABJJ3hIHjB1Bi.$"));
	assert_eq!(h.len(), 29 + 1 + 43);
	assert!(super::verify(&Mixer, "pleaseletmein", &h));
	assert!(!super::verify(&Mixer, "pleaseletmeout", &h));
    }

    #[test]
    fn no_backend() {
	assert_eq!(super::crypt(b"x", "$y$j9T$LdJMENpBABJJ3hIHjB1Bi.", None), Err(Error::AlgorithmDisabled));
	assert_eq!(super::crypt(b"x", "$y$", None), Err(Error::InvalidSetting));
    }
}
