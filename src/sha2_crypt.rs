// Common routines for SHA-2 hashing.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use sha2::Digest;
use zeroize::Zeroizing;
use crate::enc_dec::encode64_le;
use crate::setting::{self, RoundsLimits};
use super::{Result, HashSetup};

/// Minimum rounds.
pub const MIN_ROUNDS: u32 = 1000;
/// Maximum rounds.
pub const MAX_ROUNDS: u32 = 999999999;
/// Default number of rounds.
pub const DEFAULT_ROUNDS: u32 = 5000;
/// Maximum (and default) salt length.
pub const MAX_SALT_LEN: usize = 16;

pub const LIMITS: RoundsLimits = RoundsLimits { default: DEFAULT_ROUNDS, min: MIN_ROUNDS, max: MAX_ROUNDS };

/// Fill `len` bytes by repeating `block`.
fn recycled(block: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(block.iter().copied().cycle().take(len).collect())
}

pub fn sha2_crypt<D: Digest>(pass: &[u8], setting: &str, trn_table: &[u8], magic: &str) -> Result<String> {
    let parsed = setting::parse(setting, magic, true, MAX_SALT_LEN)?;
    let salt = parsed.salt.as_bytes();
    let rounds = parsed.rounds.map(|r| setting::clamp_rounds(r, MIN_ROUNDS, MAX_ROUNDS));
    let dsize = <D as Digest>::output_size();

    let mut dgst_b = D::new();
    dgst_b.update(pass);
    dgst_b.update(salt);
    dgst_b.update(pass);
    let hash_b = Zeroizing::new(dgst_b.finalize().to_vec());

    let mut dgst_a = D::new();
    dgst_a.update(pass);
    dgst_a.update(salt);
    dgst_a.update(&recycled(&hash_b, pass.len())[..]);

    let mut p = pass.len();
    while p > 0 {
	match p & 1 {
	    0 => dgst_a.update(pass),
	    _ => dgst_a.update(&hash_b[..]),
	}
	p >>= 1;
    }
    let mut hash_a = Zeroizing::new(dgst_a.finalize().to_vec());

    let mut dgst_p = D::new();
    for _ in 0..pass.len() {
	dgst_p.update(pass);
    }
    let seq_p = recycled(&Zeroizing::new(dgst_p.finalize().to_vec()), pass.len());

    let mut dgst_s = D::new();
    for _ in 0..MAX_SALT_LEN + (hash_a[0] as usize) {
	dgst_s.update(salt);
    }
    let seq_s = recycled(&Zeroizing::new(dgst_s.finalize().to_vec()), salt.len());

    for r in 0..rounds.unwrap_or(DEFAULT_ROUNDS) {
	let mut dgst_a = D::new();
	if r % 2 == 1 {
	    dgst_a.update(&seq_p[..]);
	} else {
	    dgst_a.update(&hash_a[..]);
	}
	if r % 3 > 0 {
	    dgst_a.update(&seq_s[..]);
	}
	if r % 7 > 0 {
	    dgst_a.update(&seq_p[..]);
	}
	if r % 2 == 1 {
	    dgst_a.update(&hash_a[..]);
	} else {
	    dgst_a.update(&seq_p[..]);
	}
	hash_a = Zeroizing::new(dgst_a.finalize().to_vec());
    }
    let mut transposed = Zeroizing::new(vec![0u8; dsize]);
    for (i, &ti) in trn_table.iter().enumerate() {
	transposed[i] = hash_a[ti as usize];
    }

    match rounds {
	Some(rounds) => Ok(format!("{}rounds={}${}${}", magic, rounds, parsed.salt, encode64_le(&transposed))),
	None => Ok(format!("{}{}${}", magic, parsed.salt, encode64_le(&transposed))),
    }
}

/// Turn a `HashSetup` into a setting. Rounds are clamped into range and
/// written out only if given; a missing salt is generated.
pub fn sha2_setting(param: &HashSetup, magic: &str) -> Result<String> {
    let mut setting = String::from(magic);
    if let Some(r) = param.rounds {
	setting.push_str(&format!("rounds={}$", setting::clamp_rounds(r as u64, MIN_ROUNDS, MAX_ROUNDS)));
    }
    match param.salt {
	Some(salt) => setting.push_str(salt),
	None => {
	    let rbytes = crate::random::bytes(12)?;
	    let generated = setting::gensalt("", MAX_SALT_LEN, &LIMITS, 0, &rbytes)?;
	    setting.push_str(&generated);
	},
    }
    Ok(setting)
}
