//! Sun MD5 based hash.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The MD5-based algorithm introduced in Solaris 9. Each round hashes the
//! previous digest, the round number and, depending on a pseudorandom
//! coin toss over the digest bits, a fixed passage of public-domain
//! text. Its output stays weak by modern standards and it should be used
//! for backward compatibility only.
//!
//! # Example
//!
//! ```
//! use unixcrypt::sun_md5;
//!
//! assert!(sun_md5::verify("password", "$md5,rounds=5000$abcdefgh$$BLDTpoFp.rOuMkDqRJHGl."));
//! ```
//!
//! # Parameters
//!
//! * __Password length__: unlimited.
//!
//! * __Salt length__: unlimited. Generated salts are 8 characters.
//!
//! * __Rounds__: 4096 plus an optional 0 to 2<sup>32</sup>-1 additional
//! rounds; larger values wrap around. Generated settings ask for at least
//! 32768 additional rounds.
//!
//! # Hash Format
//!
//! The format of the hash is
//! __`$md5,rounds=`__*`{rounds}`*__$__*`{salt}`*__$$__*`{checksum}`*, where:
//!
//! * *`{rounds}`* is the number of additional rounds. The whole
//!   __`,rounds=`__*`{rounds}`* part may be omitted.
//!
//! * *`{salt}`* is a non-empty salt string, which must be followed by `$`.
//!
//! * *`{checksum}`* is a 22-character Base64 encoding of the checksum.
//!
//! For compatibility with Solaris, the `$` which follows the salt is part
//! of the hashed setting only if it's followed by another `$` or ends the
//! setting.

use md5::{Md5, Digest};
use zeroize::Zeroizing;
use super::{Result, HashSetup, IntoSetting, consteq};
use crate::enc_dec::{encode_val, is_hash64_char};
use crate::error::Error;
use crate::parse::{HashSlice, HashIterator};
use crate::random;

pub(crate) const SUNMD5_MAGIC: &str = "$md5";
pub(crate) const NRBYTES: usize = 8;
const BASIC_ROUND_COUNT: u32 = 4096;
const MAX_ROUNDS: u64 = 0xffff_ffff;
const MIN_GENERATED_ROUNDS: u64 = 32768;

const HAMLET_QUOTATION: &[u8] = b"\
    To be, or not to be,--that is the question:--\n\
    Whether 'tis nobler in the mind to suffer\n\
    The slings and arrows of outrageous fortune\n\
    Or to take arms against a sea of troubles,\n\
    And by opposing end them?--To die,--to sleep,--\n\
    No more; and by a sleep to say we end\n\
    The heartache, and the thousand natural shocks\n\
    That flesh is heir to,--'tis a consummation\n\
    Devoutly to be wish'd. To die,--to sleep;--\n\
    To sleep! perchance to dream:--ay, there's the rub;\n\
    For in that sleep of death what dreams may come,\n\
    When we have shuffled off this mortal coil,\n\
    Must give us pause: there's the respect\n\
    That makes calamity of so long life;\n\
    For who would bear the whips and scorns of time,\n\
    The oppressor's wrong, the proud man's contumely,\n\
    The pangs of despis'd love, the law's delay,\n\
    The insolence of office, and the spurns\n\
    That patient merit of the unworthy takes,\n\
    When he himself might his quietus make\n\
    With a bare bodkin? who would these fardels bear,\n\
    To grunt and sweat under a weary life,\n\
    But that the dread of something after death,--\n\
    The undiscover'd country, from whose bourn\n\
    No traveller returns,--puzzles the will,\n\
    And makes us rather bear those ills we have\n\
    Than fly to others that we know not of?\n\
    Thus conscience does make cowards of us all;\n\
    And thus the native hue of resolution\n\
    Is sicklied o'er with the pale cast of thought;\n\
    And enterprises of great pith and moment,\n\
    With this regard, their currents turn awry,\n\
    And lose the name of action.--Soft you now!\n\
    The fair Ophelia!--Nymph, in thy orisons\n\
    Be all my sins remember'd.\n\0";

fn nth_bit(digest: &[u8; 16], n: u32) -> u32 {
    let n = n % 128;
    (digest[(n / 8) as usize] >> (n % 8)) as u32 & 1
}

fn coin_toss(digest: &[u8; 16], round: u32) -> bool {
    let pick = |i: usize| {
	let (a, b) = (digest[i % 16] as u32, digest[(i + 3) % 16] as u32);
	let mut v = digest[((a >> (b % 5)) % 16) as usize] as u32;
	if b & (1 << (a % 8)) != 0 {
	    v /= 2;
	}
	nth_bit(digest, v)
    };
    let (mut x, mut y) = (0u32, 0u32);
    for i in 0..8 {
	x |= pick(i) << i;
	y |= pick(i + 8) << i;
    }
    if nth_bit(digest, round) != 0 {
	x /= 2;
    }
    if nth_bit(digest, round.wrapping_add(64)) != 0 {
	y /= 2;
    }
    nth_bit(digest, x) ^ nth_bit(digest, y) != 0
}

/// Length of the hashed part of the setting, and the total number of rounds.
fn parse_setting(setting: &str) -> Result<(usize, u32)> {
    let mut hs = HashSlice::new(setting);
    if !hs.eat(SUNMD5_MAGIC.as_bytes()) {
	return Err(Error::InvalidSetting);
    }
    let mut nrounds = BASIC_ROUND_COUNT;
    if hs.eat(b",rounds=") {
	match hs.decimal() {
	    Some(n) if n <= i64::MAX as u64 => nrounds = nrounds.wrapping_add(n as u32),
	    _ => return Err(Error::InvalidSetting),
	}
    }
    if !hs.eat(b"$") || hs.span(is_hash64_char).is_empty() || hs.peek() != Some(b'$') {
	return Err(Error::InvalidSetting);
    }
    let mut end = hs.pos();
    hs.eat(b"$");
    if hs.peek() == Some(b'$') {
	end = hs.pos();
	hs.eat(b"$");
    }
    Ok((if hs.at_end() { setting.len() } else { end }, nrounds))
}

pub(crate) fn crypt(pass: &[u8], setting: &str) -> Result<String> {
    let (saltlen, nrounds) = parse_setting(setting)?;

    let mut dgst = Md5::new();
    dgst.update(pass);
    dgst.update(&setting.as_bytes()[..saltlen]);
    let mut digest = Zeroizing::new([0u8; 16]);
    digest.copy_from_slice(&dgst.finalize());

    for i in 0..nrounds {
	let mut dgst = Md5::new();
	dgst.update(&digest[..]);
	if coin_toss(&digest, i) {
	    dgst.update(HAMLET_QUOTATION);
	}
	dgst.update(i.to_string().as_bytes());
	digest.copy_from_slice(&dgst.finalize());
    }

    let d = &digest;
    let mut out = String::with_capacity(saltlen + 23);
    out.push_str(&setting[..saltlen]);
    out.push('$');
    for &(b0, b1, b2) in &[(12, 6, 0), (13, 7, 1), (14, 8, 2), (15, 9, 3), (5, 10, 4)] {
	let value = d[b0] as u64 | (d[b1] as u64) << 8 | (d[b2] as u64) << 16;
	out.push_str(&encode_val(value, 4));
    }
    out.push_str(&encode_val(d[11] as u64, 2));
    Ok(out)
}

fn encode_salt(rbytes: &[u8]) -> String {
    let group = |r: &[u8]| encode_val(r[0] as u64 | (r[1] as u64) << 8 | (r[2] as u64) << 16, 4);
    group(&rbytes[0..3]) + &group(&rbytes[3..6])
}

pub(crate) fn gensalt(count: u64, rbytes: &[u8]) -> Result<String> {
    if rbytes.len() < NRBYTES {
	return Err(Error::InvalidArgument);
    }
    let count = count.clamp(MIN_GENERATED_ROUNDS, MAX_ROUNDS - 65536)
	+ ((rbytes[0] as u64) << 8) + rbytes[1] as u64;
    Ok(format!("{},rounds={}${}$", SUNMD5_MAGIC, count, encode_salt(&rbytes[2..])))
}

fn sun_md5_setting(param: &HashSetup) -> Result<String> {
    let salt = match param.salt {
	Some(salt) => salt.to_string(),
	None => encode_salt(&random::bytes(6)?),
    };
    Ok(match param.rounds {
	None | Some(0) => format!("{}${}$", SUNMD5_MAGIC, salt),
	Some(r) => format!("{},rounds={}${}$", SUNMD5_MAGIC, r, salt),
    })
}

/// Hash a password with a randomly generated salt and no additional
/// rounds.
///
/// An error is returned if the system random number generator cannot
/// be opened.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash<B: AsRef<[u8]>>(pass: B) -> Result<String> {
    crypt(pass.as_ref(), &sun_md5_setting(&HashSetup::default())?)
}

/// Hash a password with user-provided parameters.
///
/// If the `param` argument is a `&str`, it must be a setting or a complete
/// hash. The number of rounds and the salt are parsed out of that value.
/// The rounds field of a `HashSetup` gives the number of additional rounds.
#[deprecated(since="0.1.0", note="don't use this algorithm for new passwords")]
pub fn hash_with<'a, IS, B>(param: IS, pass: B) -> Result<String>
    where IS: IntoSetting<'a>, B: AsRef<[u8]>
{
    crypt(pass.as_ref(), &param.into_setting(sun_md5_setting)?)
}

/// Verify that the hash corresponds to a password.
pub fn verify<B: AsRef<[u8]>>(pass: B, hash: &str) -> bool {
    consteq(hash, crypt(pass.as_ref(), hash))
}

#[cfg(test)]
mod tests {
    use super::HashSetup;

    #[test]
    fn quotation_length() {
	assert_eq!(super::HAMLET_QUOTATION.len(), 1517);
    }

    #[test]
    #[allow(deprecated)]
    fn custom() {
	assert_eq!(super::hash_with("$md5,rounds=5000$abcdefgh$$BLDTpoFp.rOuMkDqRJHGl.", "password").unwrap(),
	    "$md5,rounds=5000$abcdefgh$$BLDTpoFp.rOuMkDqRJHGl.");
	assert_eq!(super::hash_with(HashSetup { salt: Some("abcdefgh"), rounds: Some(5000) }, "password").unwrap(),
	    "$md5,rounds=5000$abcdefgh$$BLDTpoFp.rOuMkDqRJHGl.");
    }

    #[test]
    #[allow(deprecated)]
    fn dollar_quirk() {
	assert_eq!(super::hash_with("$md5$abcdefgh$", "password").unwrap(),
	    "$md5$abcdefgh$$ZxccX5lio58EZKsCI/Peg0");
	assert_eq!(super::hash_with("$md5$abcdefgh$xx", "password").unwrap(),
	    "$md5$abcdefgh$iBVxUQAxL9gcg5D6Ac.qv/");
    }

    #[test]
    fn generated_setting() {
	let rbytes = [0u8, 1, 0, 0, 0, 0, 0, 0];
	assert_eq!(super::gensalt(0, &rbytes).unwrap(), "$md5,rounds=32769$........$");
	assert_eq!(super::gensalt(u64::MAX, &rbytes).unwrap(), "$md5,rounds=4294901760$........$");
	assert!(super::gensalt(0, &rbytes[..7]).is_err());
    }

    #[test]
    #[allow(deprecated)]
    fn zero_rounds() {
	let hash = super::hash_with("$md5,rounds=0$abcdefgh$", "password").unwrap();
	assert!(hash.starts_with("$md5,rounds=0$abcdefgh$$"));
	assert_ne!(hash[24..], super::hash_with("$md5$abcdefgh$", "password").unwrap()[15..]);
	assert!(super::verify("password", &hash));
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected="value: InvalidSetting")]
    fn unterminated_salt() {
	let _ = super::hash_with("$md5$saltsalt", "password").unwrap();
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected="value: InvalidSetting")]
    fn empty_salt() {
	let _ = super::hash_with("$md5$$", "password").unwrap();
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected="value: InvalidSetting")]
    fn rounds_without_comma() {
	let _ = super::hash_with("$md5$rounds=5$salt$", "password").unwrap();
    }

    #[test]
    fn malformed_settings() {
	for setting in &["$md5", "$md5,rounds=$abc$", "$md5,rounds=12x$abc$", "$md5,rounds=5000", "$md5abc$"] {
	    assert!(super::parse_setting(setting).is_err(), "{}", setting);
	}
	assert_eq!(super::parse_setting("$md5,rounds=10$ab$").unwrap(), (18, 4106));
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected="value: InvalidSetting")]
    fn bad_salt_char() {
	let _ = super::hash_with("$md5$abc!defg$", "password").unwrap();
    }
}
