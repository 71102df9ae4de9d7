// Setting grammar of the digest-stretching family.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//
// The grammar is `{magic}[rounds={digits}$]{salt}[${anything}]`. The salt is
// the longest run of crypt alphabet characters, which must be followed by
// the end of the string or a `$`, and is silently cut to the method's
// maximum. Whatever follows the salt (an old hash, when verifying) is
// ignored.

use crate::enc_dec::{is_hash64_char, encode_val};
use crate::error::Error;
use crate::parse::HashSlice;
use super::Result;

const ROUNDS_TAG: &[u8] = b"rounds=";

/// A parsed setting.
#[derive(Debug, PartialEq, Eq)]
pub struct Setting<'a> {
    /// The raw `rounds=` value, if present. Saturates instead of overflowing;
    /// range checks belong to the method.
    pub rounds: Option<u64>,
    /// The salt, already truncated.
    pub salt: &'a str,
    /// Length of the prefix of the setting which the parse consumed.
    pub span: usize,
}

/// Parse a setting string for a method with the given magic prefix.
pub fn parse<'a>(setting: &'a str, magic: &str, allow_rounds: bool, max_salt: usize) -> Result<Setting<'a>> {
    let mut hs = HashSlice::new(setting);
    if !hs.eat(magic.as_bytes()) {
	return Err(Error::InvalidSetting);
    }
    let rounds = if allow_rounds && hs.eat(ROUNDS_TAG) {
	let n = hs.decimal().ok_or(Error::InvalidSetting)?;
	if !hs.eat(b"$") {
	    return Err(Error::InvalidSetting);
	}
	Some(n)
    } else {
	None
    };
    let start = hs.pos();
    let salt_len = hs.span(is_hash64_char).len();
    match hs.peek() {
	None | Some(b'$') => (),
	Some(_) => return Err(Error::InvalidSetting),
    }
    let salt_len = salt_len.min(max_salt);
    Ok(Setting { rounds, salt: &setting[start..start + salt_len], span: start + salt_len })
}

/// Clamp a raw rounds value into `min..=max`.
pub fn clamp_rounds(rounds: u64, min: u32, max: u32) -> u32 {
    rounds.clamp(min as u64, max as u64) as u32
}

/// Round count bounds of a method: default, minimum, maximum.
pub struct RoundsLimits {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

/// Build a setting in this grammar from random bytes. Every three bytes
/// give four salt characters, up to `max_salt`. A zero `count` selects the
/// default, and `rounds=` is written only for a non-default count.
///
/// A count above the maximum is an error. A count below the minimum is
/// raised to it, unless the method has a fixed cost (`min == max`), in
/// which case only that cost is accepted.
pub fn gensalt(magic: &str, max_salt: usize, limits: &RoundsLimits, count: u64, rbytes: &[u8]) -> Result<String> {
    if rbytes.len() < 3 || count > limits.max as u64
	|| (limits.min == limits.max && count != 0 && count != limits.min as u64)
    {
	return Err(Error::InvalidArgument);
    }
    let count = if count == 0 { limits.default } else { clamp_rounds(count, limits.min, limits.max) };
    let mut out = String::from(magic);
    if count != limits.default {
	out.push_str(&format!("rounds={}$", count));
    }
    let mut salt_len = 0;
    for group in rbytes.chunks_exact(3) {
	if salt_len >= max_salt {
	    break;
	}
	let value = group[0] as u64 | (group[1] as u64) << 8 | (group[2] as u64) << 16;
	out.push_str(&encode_val(value, 4));
	salt_len += 4;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{parse, clamp_rounds, gensalt, RoundsLimits, Setting};
    use crate::error::Error;

    #[test]
    fn with_rounds() {
	assert_eq!(parse("$6$rounds=10000$saltstringsaltstring$", "$6$", true, 16).unwrap(),
	    Setting { rounds: Some(10000), salt: "saltstringsaltst", span: 32 });
    }

    #[test]
    fn trailing_hash_ignored() {
	let s = parse("$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0", "$1$", false, 8).unwrap();
	assert_eq!(s.salt, "5pZSV9va");
	assert_eq!(s.rounds, None);
	assert_eq!(s.span, 11);
    }

    #[test]
    fn empty_salt() {
	assert_eq!(parse("$5$", "$5$", true, 16).unwrap().salt, "");
	assert_eq!(parse("$5$$", "$5$", true, 16).unwrap().salt, "");
    }

    #[test]
    fn bad_settings() {
	assert_eq!(parse("$6$rounds=$salt", "$6$", true, 16), Err(Error::InvalidSetting));
	assert_eq!(parse("$6$rounds=12x$salt", "$6$", true, 16), Err(Error::InvalidSetting));
	assert_eq!(parse("$6$sa%lt", "$6$", true, 16), Err(Error::InvalidSetting));
	assert_eq!(parse("$5$salt", "$6$", true, 16), Err(Error::InvalidSetting));
	assert_eq!(parse("$1$rounds=5000$salt", "$1$", false, 8), Err(Error::InvalidSetting));
    }

    #[test]
    fn rounds_clamped() {
	assert_eq!(clamp_rounds(10, 1000, 999_999_999), 1000);
	assert_eq!(clamp_rounds(u64::MAX, 1000, 999_999_999), 999_999_999);
	assert_eq!(clamp_rounds(5000, 1000, 999_999_999), 5000);
    }

    const SHA: RoundsLimits = RoundsLimits { default: 5000, min: 1000, max: 999_999_999 };

    #[test]
    fn generated_settings() {
	let rbytes = [0u8; 15];
	assert_eq!(gensalt("$5$", 16, &SHA, 0, &rbytes).unwrap(), "$5$................");
	assert_eq!(gensalt("$5$", 16, &SHA, 5000, &rbytes[..3]).unwrap(), "$5$....");
	assert_eq!(gensalt("$6$", 16, &SHA, 10, &rbytes[..6]).unwrap(), "$6$rounds=1000$........");
	assert_eq!(gensalt("$6$", 16, &SHA, 999_999_999, &rbytes[..3]).unwrap(), "$6$rounds=999999999$....");
	assert_eq!(gensalt("$1$", 8, &FIXED, 1000, &rbytes).unwrap(), "$1$........");
	assert_eq!(gensalt("$1$", 8, &SHA, 0, &[0xff, 0xff, 0xff]).unwrap(), "$1$zzzz");
    }

    const FIXED: RoundsLimits = RoundsLimits { default: 1000, min: 1000, max: 1000 };

    #[test]
    fn out_of_range_counts() {
	let rbytes = [0u8; 15];
	assert_eq!(gensalt("$6$", 16, &SHA, 1_000_000_000, &rbytes), Err(Error::InvalidArgument));
	assert_eq!(gensalt("$5$", 16, &SHA, u64::MAX, &rbytes), Err(Error::InvalidArgument));
	assert_eq!(gensalt("$1$", 8, &FIXED, 7, &rbytes), Err(Error::InvalidArgument));
	assert_eq!(gensalt("$1$", 8, &FIXED, 1001, &rbytes), Err(Error::InvalidArgument));
    }

    #[test]
    #[should_panic(expected="value: InvalidArgument")]
    fn too_few_random_bytes() {
	let _ = gensalt("$5$", 16, &SHA, 0, &[0, 0]).unwrap();
    }
}
