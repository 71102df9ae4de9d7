//! Standard *BSD hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! Bcrypt is a hashing algorithm based on the Blowfish stream cipher,
//! originally developed for OpenBSD and since adopted on other BSD
//! variants and other systems. It has a large salt, variable number
//! of rounds, and no known weaknesses. It is the method used for new
//! hashes when no other is requested.
//!
//! # Examples
//!
//! To hash a password with a randomly generated salt, default cost,
//! and default output variant (__2b__):
//!
//! ```
//! use unixcrypt::bcrypt;
//!
//! let hash = bcrypt::hash("password").unwrap();
//! ```
//!
//! To use a different variant (__2y__), while letting the program
//! pick the salt and use the default cost:
//!
//! ```
//! use unixcrypt::bcrypt::{self, BcryptSetup, BcryptVariant};
//!
//! let hash = bcrypt::hash_with(BcryptSetup {
//!                variant: Some(BcryptVariant::V2y),
//!                ..Default::default() },
//!            "password").unwrap();
//! ```
//!
//! # Parameters
//!
//! * __Password length__: up to 72 characters. Longer passwords are
//! truncated to the maximum length.
//!
//! * __Salt length__: 16 random bytes, encoded as 22 Base64 characters.
//!
//! * __Cost__: logarithmic value between 4 and 31, inclusive. Increasing
//! the value by 1 doubles the amount of work. The default is 10.
//!
//! # Hash Format
//!
//! The format of the hash is
//! **`$`**_`{variant}`_**`$`**_`{cost}`_**`$`**_`{salt}{checksum}`_, where:
//!
//! * _`{variant}`_ is one of **2a**, **2b**, **2x** or **2y**. The default is
//! **2b**. See [`BcryptVariant`](enum.BcryptVariant.html) for the
//! differences.
//!
//! * _`{cost}`_ is a two-digit decimal cost value between 4 and 31. Values
//! below 10 have a leading zero.
//!
//! * _`{salt}`_ is a 22-character Base64 encoding of the 16 bytes of salt. The
//! salt must be exactly this long.
//!
//! * _`{checksum}`_ is a 31-character Base64 encoding of the computed hash.

use super::{Result, HashSetup, consteq, FindNul};
use crate::enc_dec::{bcrypt_hash64_encode, bcrypt_hash64_decode};
use crate::error::Error;
use crate::random;
use crate::parse::{HashSlice, HashIterator};
use std::fmt;
use std::default::Default;
use blowfish::Blowfish;
use byteorder::{BE, ByteOrder};
use zeroize::Zeroizing;

const MAX_PASS_LEN: usize = 72;
const KEY_WORDS: usize = 18;
const DEFAULT_VARIANT: BcryptVariant = BcryptVariant::V2b;
const ENC_SALT_LEN: usize = 22;
/// Minimum cost.
pub const MIN_COST: u32 = 4;
/// Maximum cost.
pub const MAX_COST: u32 = 31;
/// Default cost.
pub const DEFAULT_COST: u32 = 10;
/// Cost used by salt generation when none is requested.
pub const GENSALT_DEFAULT_COST: u32 = 5;
pub(crate) const NRBYTES: usize = 16;

/// Identifiers of algorithm variants.
///
/// Bcrypt has a long history of use, during which a number bugs were found
/// and fixed in the widely-used implementations. Some bugs were serious
/// enough to warrant a change in the minor version number of the algorithm
/// identifier.
///
/// There are two major bcrypt implementations: OpenBSD (the original, used in
/// all *BSDs) and Openwall. A short history of variants is as follows:
///
/// * **2** is the original OpenBSD version, which was very quickly replaced by
///
/// * **2a**, which fixed a bug that caused passwords with repeated strings to
/// produce the same hash as those with a single string ("abab" hashed the same
/// as "ab".) This was the most widely used version, until
///
/// * **2y**, produced by Openwall, which fixed a sign-extension bug that
/// caused certain passwords with high-bit-set characters to produce weak keys.
/// The Openwall fix also introduced
///
/// * **2x**, meant for unambiguously identifying pre-fix **2a** hashes as
/// those produced by the buggy algorithm. Some time later, a wraparound bug
/// was found in OpenBSD, leading to
///
/// * **2b**, which fixed the bug. This variant is the current default in
/// most implementations.
///
/// This crate follows Openwall: **2b** and **2y** are computed correctly,
/// **2x** reproduces the sign-extension bug so that old hashes still verify,
/// and **2a** computes correctly but refuses to match a buggy **2a** hash
/// for the few passwords where the two would collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcryptVariant {
    /// Second OpenBSD variant, fixed repeated string hashing.
    V2a,
    /// Third OpenBSD variant, fixed a wraparound bug.
    V2b,
    /// Openwall marker for hashes made with the sign extension bug.
    V2x,
    /// Openwall variant, fixed a sign extension bug.
    V2y,
}

impl BcryptVariant {
    fn from_tag(tag: u8) -> Option<BcryptVariant> {
	match tag {
	    b'a' => Some(BcryptVariant::V2a),
	    b'b' => Some(BcryptVariant::V2b),
	    b'x' => Some(BcryptVariant::V2x),
	    b'y' => Some(BcryptVariant::V2y),
	    _ => None,
	}
    }

    /// Key setup flags: bit 0 emulates the sign extension bug, bit 1
    /// enables the countermeasure.
    fn flags(self) -> u32 {
	match self {
	    BcryptVariant::V2a => 2,
	    BcryptVariant::V2b => 4,
	    BcryptVariant::V2x => 1,
	    BcryptVariant::V2y => 0,
	}
    }
}

impl fmt::Display for BcryptVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	write!(f, "{}", match *self {
	    BcryptVariant::V2a => "2a",
	    BcryptVariant::V2b => "2b",
	    BcryptVariant::V2x => "2x",
	    BcryptVariant::V2y => "2y",
	})
    }
}

/// Setup struct for bcrypt.
///
/// In addition to custom salt and cost values, a bcrypt hash can use different
/// algorithm variant identifiers.
pub struct BcryptSetup<'a> {
    /// Custom salt.
    pub salt: Option<&'a str>,
    /// Custom cost.
    pub cost: Option<u32>,
    /// Algorithm variant.
    pub variant: Option<BcryptVariant>,
}

/// A trait for converting a type into a `BcryptSetup` struct.
pub trait IntoBcryptSetup<'a> {
    /// The conversion function.
    fn into_bcrypt_setup(self) -> Result<BcryptSetup<'a>>;
}

const MAGIC_LEN: usize = 4;

impl<'a> IntoBcryptSetup<'a> for &'a str {
    fn into_bcrypt_setup(self) -> Result<BcryptSetup<'a>> {
	let mut hs = HashSlice::new(self);
	let variant = match hs.take(MAGIC_LEN) {
	    Some(&[b'$', b'2', tag, b'$']) => BcryptVariant::from_tag(tag).ok_or(Error::InvalidSetting)?,
	    _ => return Err(Error::InvalidSetting),
	};
	let cost = match hs.take(3) {
	    Some(&[d1 @ b'0'..=b'3', d2 @ b'0'..=b'9', b'$']) => ((d1 - b'0') * 10 + (d2 - b'0')) as u32,
	    _ => return Err(Error::InvalidSetting),
	};
	if cost < MIN_COST || cost > MAX_COST {
	    return Err(Error::InvalidSetting);
	}
	let salt = hs.take(ENC_SALT_LEN).ok_or(Error::InvalidSetting)?;
	let salt = std::str::from_utf8(salt).map_err(|_| Error::InvalidSetting)?;
	Ok(BcryptSetup { salt: Some(salt), cost: Some(cost), variant: Some(variant) })
    }
}

impl<'a> IntoBcryptSetup<'a> for HashSetup<'a> {
    fn into_bcrypt_setup(self) -> Result<BcryptSetup<'a>> {
	Ok(BcryptSetup { salt: self.salt, cost: self.rounds, variant: Some(DEFAULT_VARIANT) })
    }
}

impl<'a> IntoBcryptSetup<'a> for BcryptSetup<'a> {
    fn into_bcrypt_setup(self) -> Result<BcryptSetup<'a>> {
	Ok(self)
    }
}

impl<'a> Default for BcryptSetup<'a> {
    fn default() -> Self {
	BcryptSetup { salt: None, cost: Some(DEFAULT_COST), variant: Some(DEFAULT_VARIANT) }
    }
}

/// Build the 18 key words from the password (which includes its
/// terminating NUL), cycling over it as needed. Returns the words for the
/// salted expansion, which may carry the countermeasure bit, and the
/// words for the iterated expansion.
fn key_words(password: &[u8], flags: u32) -> (Zeroizing<[u32; KEY_WORDS]>, Zeroizing<[u32; KEY_WORDS]>) {
    let bug = (flags & 1) as usize;
    let safety = (flags & 2) << 15;
    let (mut sign, mut diff) = (0u32, 0u32);
    let mut expanded = Zeroizing::new([0u32; KEY_WORDS]);
    let mut bytes = password.iter().cycle();
    for word in expanded.iter_mut() {
	let mut tmp = [0u32; 2];
	for j in 0..4 {
	    let b = bytes.next().copied().unwrap_or(0);
	    tmp[0] = (tmp[0] << 8) | b as u32;
	    tmp[1] = (tmp[1] << 8) | (b as i8 as i32 as u32);
	    if j > 0 {
		sign |= tmp[1] & 0x80;
	    }
	}
	diff |= tmp[0] ^ tmp[1];
	*word = tmp[bug];
    }
    diff |= diff >> 16;
    diff &= 0xffff;
    diff += 0xffff;
    sign <<= 9;
    sign &= !diff & safety;
    let mut initial = expanded.clone();
    initial[0] ^= sign;
    (initial, expanded)
}

fn to_bytes(words: &[u32; KEY_WORDS]) -> Zeroizing<[u8; KEY_WORDS * 4]> {
    let mut out = Zeroizing::new([0u8; KEY_WORDS * 4]);
    BE::write_u32_into(words, &mut out[..]);
    out
}

fn bcrypt(cost: u32, salt: &[u8; 16], password: &[u8], flags: u32, output: &mut [u8; 24]) {
    let (initial, expanded) = key_words(password, flags);
    let (initial, expanded) = (to_bytes(&initial), to_bytes(&expanded));

    let mut state: Blowfish = Blowfish::bc_init_state();
    state.salted_expand_key(salt, &initial[..]);
    for _ in 0..1u64 << cost {
	state.bc_expand_key(&expanded[..]);
	state.bc_expand_key(salt);
    }

    let mut ctext = [0x4f727068, 0x65616e42, 0x65686f6c, 0x64657253, 0x63727944, 0x6f756274];
    for i in (0..6).step_by(2) {
	let mut lr = [ctext[i], ctext[i + 1]];
	for _ in 0..64 {
	    lr = state.bc_encrypt(lr);
	}
	ctext[i] = lr[0];
	ctext[i + 1] = lr[1];
    }
    BE::write_u32_into(&ctext, &mut output[..]);
}

fn do_bcrypt(pass: &[u8], salt: &[u8; 16], cost: u32, variant: BcryptVariant) -> Result<String> {
    let pass = pass.nul_terminated_subslice();
    let mut upd_pass = Zeroizing::new(Vec::with_capacity(MAX_PASS_LEN));
    upd_pass.extend_from_slice(&pass[..pass.len().min(MAX_PASS_LEN)]);
    if upd_pass.len() < MAX_PASS_LEN {
	upd_pass.push(0u8);
    }
    let mut output = Zeroizing::new([0u8; 24]);
    bcrypt(cost, salt, &upd_pass, variant.flags(), &mut output);
    Ok(format!("${}${:02}${}{}", variant, cost,
	bcrypt_hash64_encode(salt), bcrypt_hash64_encode(&output[..23])))
}

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    hash_with(setting, pass)
}

/// Salt generation for one of the variants. Hashes with the __2x__ tag
/// are never generated.
pub(crate) fn gensalt(variant: BcryptVariant, count: u64, rbytes: &[u8]) -> Result<String> {
    if variant == BcryptVariant::V2x || rbytes.len() < NRBYTES {
	return Err(Error::InvalidArgument);
    }
    let cost = match count {
	0 => GENSALT_DEFAULT_COST as u64,
	4..=31 => count,
	_ => return Err(Error::InvalidArgument),
    };
    Ok(format!("${}${:02}${}", variant, cost, bcrypt_hash64_encode(&rbytes[..NRBYTES])))
}

/// Hash a password with a randomly generated salt, default cost,
/// and default variant.
///
/// An error is returned if the system random number generator cannot
/// be opened.
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    let mut salt_buf = [0u8; 16];
    random::gen_salt_bytes(&mut salt_buf)?;
    do_bcrypt(pass.as_ref(), &salt_buf, DEFAULT_COST, DEFAULT_VARIANT)
}

/// Hash a password with user-provided parameters.
///
/// Bcrypt has its own setup struct because of the additional variant
/// field. An ordinary `HashSetup` can be converted into `BcryptSetup`, which
/// will set the variant to default. The `Default` trait is implemented for
/// `BcryptSetup`, which makes it easier to initialize just the desired
/// fields (see the module-level example.)
pub fn hash_with<'a, IBS, B>(param: IBS, pass: B) -> Result<String>
    where IBS: IntoBcryptSetup<'a>, B: AsRef<[u8]>
{
    let bs = param.into_bcrypt_setup()?;
    let cost = if let Some(c) = bs.cost {
	if c < MIN_COST || c > MAX_COST {
	    return Err(Error::InvalidArgument);
	}
	c
    } else { DEFAULT_COST };
    let variant = bs.variant.unwrap_or(DEFAULT_VARIANT);
    let mut salt_buf = [0u8; 16];
    match bs.salt {
	Some(salt) => bcrypt_hash64_decode(salt.as_bytes(), &mut salt_buf)?,
	None => random::gen_salt_bytes(&mut salt_buf)?,
    }
    do_bcrypt(pass.as_ref(), &salt_buf, cost, variant)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, hash_with(hash, pass))
}

#[cfg(test)]
mod tests {
    use super::{BcryptSetup, BcryptVariant};

    #[test]
    fn variant() {
	assert_eq!("$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe",
	    super::hash_with(BcryptSetup { salt: Some("bvIG6Nmid91Mu9RcmmWZfO"), cost: Some(5),
		variant: Some(BcryptVariant::V2y) },
	    "password").unwrap());
    }

    #[test]
    fn openwall_vectors() {
	for &(hash, pass) in &[
	    ("$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW", &b"U*U"[..]),
	    ("$2a$05$CCCCCCCCCCCCCCCCCCCCC.VGOzA784oUp/Z0DY336zx7pLYAy0lwK", b"U*U*"),
	    ("$2a$05$XXXXXXXXXXXXXXXXXXXXXOAcXxm9kjPGEMsLznoKqmqw7tc8WCx4a", b"U*U*U"),
	    ("$2a$05$abcdefghijklmnopqrstuu5s2v8.iXieOjg/.AySBTTZIIVFJeBui",
	     b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789chars after 72 are ignored"),
	    ("$2x$05$/OK.fbVrR/bpIqNJ5ianF.CE5elHaaO4EbggVDjb8P19RukzXSM3e", b"\xa3"),
	    ("$2y$05$/OK.fbVrR/bpIqNJ5ianF.CE5elHaaO4EbggVDjb8P19RukzXSM3e", b"\xff\xff\xa3"),
	    ("$2a$05$/OK.fbVrR/bpIqNJ5ianF.nqd1wy.pTMdcvrRWxyiGL2eMz.2a85.", b"\xff\xff\xa3"),
	    ("$2b$05$/OK.fbVrR/bpIqNJ5ianF.Sa7shbm4.OzKpvFnX1pQLmQW96oUlCq", b"\xa3"),
	    ("$2x$05$/OK.fbVrR/bpIqNJ5ianF.o./n25XVfn6oAPaUvHe.Csk4zRfsYPi", b"1\xa3345"),
	    ("$2a$05$/OK.fbVrR/bpIqNJ5ianF.ZC1JEJ8Z4gPfpe1JOr/oyPXTWl9EFd.", b"\xff\xa334\xff\xff\xff\xa3345"),
	    ("$2x$05$6bNw2HLQYeqHYyBfLMsv/OiwqTymGIGzFsA4hOTWebfehXHNprcAS", b"\xd1\x91"),
	    ("$2x$05$6bNw2HLQYeqHYyBfLMsv/O9LIGgn8OMzuDoHfof8AQimSGfcSWxnS", b"\xd0\xc1\xd2\xcf\xcc\xd8"),
	    ("$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy", b""),
	] {
	    assert_eq!(super::hash_with(hash, pass).unwrap(), hash);
	}
    }

    #[test]
    fn noncanonical_salt_reencoded() {
	let h = super::hash_with("$2b$05$bvIG6Nmid91Mu9RcmmWZfP", "password").unwrap();
	assert!(h.starts_with("$2b$05$bvIG6Nmid91Mu9RcmmWZfO"));
    }

    #[test]
    fn generated_setting() {
	assert_eq!(super::gensalt(BcryptVariant::V2b, 0, &[0u8; 16]).unwrap(), "$2b$05$......................");
	assert_eq!(super::gensalt(BcryptVariant::V2y, 12, &[0u8; 16]).unwrap(), "$2y$12$......................");
	assert!(super::gensalt(BcryptVariant::V2x, 0, &[0u8; 16]).is_err());
	assert!(super::gensalt(BcryptVariant::V2b, 3, &[0u8; 16]).is_err());
	assert!(super::gensalt(BcryptVariant::V2b, 32, &[0u8; 16]).is_err());
	assert!(super::gensalt(BcryptVariant::V2b, 0, &[0u8; 15]).is_err());
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn cost_out_of_range() {
	let _ = super::hash_with("$2b$32$bvIG6Nmid91Mu9RcmmWZfO", "password").unwrap();
    }

    #[test]
    #[should_panic(expected="value: InvalidSetting")]
    fn one_digit_cost() {
	let _ = super::hash_with("$2b$5$bvIG6Nmid91Mu9RcmmWZfO", "password").unwrap();
    }
}
