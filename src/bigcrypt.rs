//! Digital UNIX extended DES hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! Bigcrypt lifts the eight-character limit of the traditional DES hash
//! by hashing the passphrase in 8-character segments. Each segment is
//! hashed like a traditional DES password, salted with the first two
//! characters of the previous segment's output. It shares all of the
//! weaknesses of DES crypt.
//!
//! A setting of thirteen characters or less is handled exactly like a
//! traditional DES hash, so only longer settings select bigcrypt.
//!
//! # Example
//!
//! ```
//! use unixcrypt::bigcrypt;
//!
//! assert!(bigcrypt::verify("alexander", "CxcR5MY6TS58EVRba0DA/cW."));
//! ```
//!
//! # Hash Format
//!
//! The format of the hash is *`{salt}`*_`{checksum}`_, where the
//! checksum is 11 characters for each 8-character segment of the
//! passphrase, up to 16 segments.

use super::{Result, consteq};
use crate::des_crypt::{DesState, two_char_salt, encode_two_char_salt, key_block, gen_hash};
use crate::unix_crypt;

const MAX_SEGMENTS: usize = 16;
const SEGMENT_LEN: usize = 8;
const TRAD_LEN: usize = 13;

pub(crate) fn crypt(pass: &[u8], setting: &str, des: &mut DesState) -> Result<String> {
    if setting.len() <= TRAD_LEN {
	return unix_crypt::crypt(pass, setting, des);
    }
    let mut salt = two_char_salt(setting.as_bytes())?;
    let mut out = encode_two_char_salt(salt);
    let mut chunks = pass.chunks(SEGMENT_LEN);
    for _ in 0..MAX_SEGMENTS {
	let chunk = chunks.next().unwrap_or(&[]);
	des.set_key(&key_block(chunk));
	des.set_salt(salt);
	let seg = gen_hash(des, 25);
	salt = two_char_salt(seg.as_bytes())?;
	out.push_str(&seg);
	if chunks.len() == 0 {
	    break;
	}
    }
    Ok(out)
}

/// Hash a password with a user-provided setting.
///
/// The setting must start with a two-character DES salt and be longer than
/// thirteen characters, or the traditional DES hash will be computed.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash_with<B: AsRef<[u8]>>(setting: &str, pass: B) -> Result<String> {
    crypt(pass.as_ref(), setting, &mut DesState::new())
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash, &mut DesState::new()))
}

#[cfg(test)]
mod tests {
    #[test]
    #[allow(deprecated)]
    fn two_segments() {
	for &(setting, hash, pass) in &[
	    ("Cx..............", "CxcR5MY6TS58EVRba0DA/cW.", "alexander"),
	    ("eA..............", "eAefYgT7O7cWwShgVcvPCWpU", "basketball"),
	    ("MM..............", "MMSKdTXbtmJOEQI5wMYARXvA", "porsche911"),
	    ("Xh..............", "XhWbBsxo8cYpYvYwQItwv0qc", "challenge"),
	] {
	    assert_eq!(super::hash_with(setting, pass).unwrap(), hash);
	    assert!(super::verify(pass, hash));
	}
    }

    #[test]
    #[allow(deprecated)]
    fn high_bit_discarded() {
	assert_eq!(super::hash_with("Cx..............", b"\xe1\xec\xe5\xf8\xe1\xee\xe4\xe5\xf2").unwrap(),
	    "CxcR5MY6TS58EVRba0DA/cW.");
    }

    #[test]
    #[allow(deprecated)]
    fn short_setting_is_traditional() {
	assert_eq!(super::hash_with("CC", "U*U*U*U*ignored").unwrap(), "CCNf8Sbh3HDfQ");
    }

    #[test]
    #[allow(deprecated)]
    fn rehash_own_output() {
	let h = super::hash_with("GA..............", "1234567890123").unwrap();
	assert_eq!(h.len(), 24);
	assert_eq!(super::hash_with(&h, "1234567890123").unwrap(), h);
    }

    #[test]
    #[allow(deprecated)]
    fn empty_passphrase_one_segment() {
	assert_eq!(super::hash_with("SD..............", "").unwrap(), "SDbsugeBiC58A");
    }

    #[test]
    #[allow(deprecated)]
    fn segment_limit() {
	let pass: Vec<u8> = (0..200u32).map(|i| b'a' + (i % 26) as u8).collect();
	let h = super::hash_with("Cx..............", &pass).unwrap();
	assert_eq!(h.len(), 2 + 16 * 11);
	assert_eq!(super::hash_with("Cx..............", &pass[..128]).unwrap(), h);
	assert_ne!(super::hash_with("Cx..............", &pass[..127]).unwrap(), h);
    }
}
