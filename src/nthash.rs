//! Windows NT password hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The MD4 digest of the passphrase in UTF-16LE, as stored by Windows and
//! adopted by FreeBSD for interoperability. Each passphrase byte is widened
//! to 16 bits, which treats the input as ISO 8859-1. There is no salt and
//! no iteration count, so the hash is very weak.
//!
//! # Example
//!
//! ```
//! use unixcrypt::nthash;
//!
//! assert!(nthash::verify("abc", "$3$$e0fba38268d0ec66ef1cb452d5885e53"));
//! ```
//!
//! # Hash Format
//!
//! The format of the hash is __`$3$$`__*`{checksum}`*, where *`{checksum}`*
//! is the digest as 32 lowercase hexadecimal digits.

use md4::{Md4, Digest};
use zeroize::Zeroizing;
use super::{Result, consteq};
use crate::error::Error;

pub(crate) const NT_MAGIC: &str = "$3$";
const HEX_DIGITS: &[u8] = b"0123456789abcdef";

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    if !setting.starts_with(NT_MAGIC) {
	return Err(Error::InvalidSetting);
    }
    let mut dgst = Md4::new();
    for &b in pass {
	dgst.update([b, 0]);
    }
    let mut hash = Zeroizing::new([0u8; 16]);
    hash.copy_from_slice(&dgst.finalize());
    let mut out = String::with_capacity(NT_MAGIC.len() + 1 + 32);
    out.push_str(NT_MAGIC);
    out.push('$');
    for &b in hash.iter() {
	out.push(HEX_DIGITS[(b >> 4) as usize] as char);
	out.push(HEX_DIGITS[(b & 0xf) as usize] as char);
    }
    Ok(out)
}

/// The setting carries no parameters, so only a zero count is accepted.
pub(crate) fn gensalt(count: u64, _rbytes: &[u8]) -> Result<String> {
    if count != 0 {
	return Err(Error::InvalidArgument);
    }
    Ok(NT_MAGIC.to_string())
}

/// Hash a password.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    crypt(pass.as_ref(), NT_MAGIC)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash))
}

#[cfg(test)]
mod tests {
    #[test]
    #[allow(deprecated)]
    fn published_vectors() {
	for &(pass, hash) in &[
	    ("", "$3$$31d6cfe0d16ae931b73c59d7e0c089c0"),
	    (" ", "$3$$71c5391067de41fad6f3063162e5eeff"),
	    ("multiple word$ $eperated by $pace$ and $pecial character$", "$3$$48370cb663dfc4a0a54555764653c7f3"),
	    ("abcdefghijklmnopqrstuvwxyz", "$3$$0bd63185f3484bb000286c85917dc12e"),
	    ("|_337T`/p3", "$3$$ca8ad8058c3226764a3af34a8edcbb2e"),
	    ("password", "$3$$8846f7eaee8fb117ad06bdd830b7586c"),
	] {
	    assert_eq!(super::hash(pass).unwrap(), hash);
	    assert!(super::verify(pass, hash));
	}
    }

    #[test]
    fn setting_suffix_ignored() {
	assert_eq!(super::crypt(b"a", "$3$anything").unwrap(), "$3$$186cb09181e2c2ecaac768c47c729904");
    }

    #[test]
    fn generated_setting() {
	assert_eq!(super::gensalt(0, &[]).unwrap(), "$3$");
	assert!(super::gensalt(1, &[]).is_err());
    }
}
