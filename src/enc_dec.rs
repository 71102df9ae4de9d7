// Encoding and decoding routines.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use crate::error::Error;
use super::Result;

pub const CRYPT_HASH64: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const CRYPT_HASH64_ENC_MAP: &[u8] = b"\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x00\x01\
				      \x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x40\x40\x40\x40\x40\x40\
				      \x40\x0c\x0d\x0e\x0f\x10\x11\x12\x13\x14\x15\x16\x17\x18\x19\x1a\
				      \x1b\x1c\x1d\x1e\x1f\x20\x21\x22\x23\x24\x25\x40\x40\x40\x40\x40\
				      \x40\x26\x27\x28\x29\x2a\x2b\x2c\x2d\x2e\x2f\x30\x31\x32\x33\x34\
				      \x35\x36\x37\x38\x39\x3a\x3b\x3c\x3d\x3e\x3f\x40\x40\x40\x40\x40";

const BCRYPT_HASH64: &[u8] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const BCRYPT_HASH64_ENC_MAP: &[u8] = b"\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x40\x00\x01\
				       \x36\x37\x38\x39\x3a\x3b\x3c\x3d\x3e\x3f\x40\x40\x40\x40\x40\x40\
				       \x40\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x0c\x0d\x0e\x0f\x10\
				       \x11\x12\x13\x14\x15\x16\x17\x18\x19\x1a\x1b\x40\x40\x40\x40\x40\
				       \x40\x1c\x1d\x1e\x1f\x20\x21\x22\x23\x24\x25\x26\x27\x28\x29\x2a\
				       \x2b\x2c\x2d\x2e\x2f\x30\x31\x32\x33\x34\x35\x40\x40\x40\x40\x40";

const BASE64_STD: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn map_lookup(map: &[u8], b: u8) -> Option<u8> {
    let idx = b.wrapping_sub(0x20) as usize;
    if idx >= map.len() {
	return None;
    }
    match map[idx] {
	64 => None,
	dec => Some(dec),
    }
}

/// Value of a character of the crypt alphabet.
pub fn hash64_index(b: u8) -> Option<u8> {
    map_lookup(CRYPT_HASH64_ENC_MAP, b)
}

pub fn is_hash64_char(b: u8) -> bool {
    hash64_index(b).is_some()
}

pub fn bcrypt_hash64_decode(enc: &[u8], decbuf: &mut [u8]) -> Result<()> {
    let mut cbuild = 0u8;
    let mut cpos = 0;
    let mut dec_idx = 0;
    for &b in enc {
	let dec = map_lookup(BCRYPT_HASH64_ENC_MAP, b).ok_or(Error::InvalidSetting)?;
	if cpos == 0 {
	    cbuild = dec;
	} else {
	    cbuild <<= cpos;
	    cbuild |= dec >> (6 - cpos);
	    decbuf[dec_idx] = cbuild;
	    dec_idx += 1;
	    if dec_idx == decbuf.len() {
		break;
	    }
	    cbuild = dec & (0x3F >> cpos);
	}
	cpos += 2;
	if cpos > 6 {
	    cpos = 0;
	}
    }
    if dec_idx < decbuf.len() {
	return Err(Error::InvalidSetting);
    }
    Ok(())
}

pub fn bcrypt_hash64_encode(bs: &[u8]) -> String {
    b_c_hash64_encode(bs, BCRYPT_HASH64)
}

pub fn crypt_hash64_encode(bs: &[u8]) -> String {
    b_c_hash64_encode(bs, CRYPT_HASH64)
}

/// Standard Base64 without padding.
pub fn base64_encode(bs: &[u8]) -> String {
    b_c_hash64_encode(bs, BASE64_STD)
}

fn b_c_hash64_encode(bs: &[u8], hs: &[u8]) -> String {
    let ngroups = (bs.len() + 2) / 3;
    let mut out = String::with_capacity(ngroups * 4);
    for g in 0..ngroups {
	let mut g_idx = g * 3;
	let mut enc = 0u32;
	for _ in 0..3 {
	    let b = (if g_idx < bs.len() { bs[g_idx] } else { 0 }) as u32;
	    enc <<= 8;
	    enc |= b;
	    g_idx += 1;
	}
	for _ in 0..4 {
	    out.push(hs[((enc >> 18) & 0x3F) as usize] as char);
	    enc <<= 6;
	}
    }
    match bs.len() % 3 {
	1 => { out.pop(); out.pop(); },
	2 => { out.pop(); },
	_ => (),
    }
    out
}

/// Standard Base64 without padding. Trailing bits must be zero.
pub fn base64_decode(enc: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(enc.len() * 3 / 4);
    let mut acc = 0u32;
    let mut acc_len = 0;
    for &b in enc {
	let dec = BASE64_STD.iter().position(|&c| c == b).ok_or(Error::InvalidSetting)? as u32;
	acc = (acc << 6) | dec;
	acc_len += 6;
	if acc_len >= 8 {
	    acc_len -= 8;
	    out.push((acc >> acc_len) as u8);
	}
    }
    if acc_len > 4 || acc & ((1 << acc_len) - 1) != 0 {
	return Err(Error::InvalidSetting);
    }
    Ok(out)
}

pub fn sha1crypt_hash64_encode(bs: &[u8; 20]) -> String {
    let mut out = String::with_capacity(28);
    for g in 0..7 {
	let g_idx = g * 3;
	let enc = if g < 6 {
	    (bs[g_idx] as u64) << 16 | (bs[g_idx + 1] as u64) << 8 | bs[g_idx + 2] as u64
	} else {
	    (bs[18] as u64) << 16 | (bs[19] as u64) << 8 | bs[0] as u64
	};
	encode_val_into(&mut out, enc, 4);
    }
    out
}

/// Little-endian encoding in 3-byte groups, as used by MD5-crypt,
/// SHA-crypt, scrypt and yescrypt.
pub fn encode64_le(bs: &[u8]) -> String {
    let mut out = String::with_capacity((bs.len() * 4 + 2) / 3);
    for group in bs.chunks(3) {
	let mut enc = 0u64;
	for (i, &b) in group.iter().enumerate() {
	    enc |= (b as u64) << (8 * i);
	}
	encode_val_into(&mut out, enc, (group.len() * 8 + 5) / 6);
    }
    out
}

/// Inverse of `encode64_le`. Every group must carry at least one full
/// byte, and the unused high bits of a short group must be zero.
pub fn decode64_le(enc: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(enc.len() * 3 / 4);
    for group in enc.chunks(4) {
	if group.len() < 2 {
	    return Err(Error::InvalidSetting);
	}
	let value = decode_val(group, group.len())?;
	let nbytes = group.len() * 6 / 8;
	if (value as u64) >> (8 * nbytes) != 0 {
	    return Err(Error::InvalidSetting);
	}
	for i in 0..nbytes {
	    out.push((value >> (8 * i)) as u8);
	}
	if out.len() > max_len {
	    return Err(Error::InvalidSetting);
	}
    }
    Ok(out)
}

/// Decode `len` characters into a little-endian value of up to 30 bits.
pub fn decode_val(val: &[u8], len: usize) -> Result<u32> {
    if val.len() < len || len > 5 {
	return Err(Error::InvalidSetting);
    }
    let mut s = 0u32;
    for (i, &b) in val[..len].iter().enumerate() {
	let dec = hash64_index(b).ok_or(Error::InvalidSetting)?;
	s |= (dec as u32) << (6 * i);
    }
    Ok(s)
}

pub fn encode_val(val: u64, nchars: usize) -> String {
    let mut out = String::with_capacity(nchars);
    encode_val_into(&mut out, val, nchars);
    out
}

fn encode_val_into(out: &mut String, mut val: u64, nchars: usize) {
    for _ in 0..nchars {
	out.push(CRYPT_HASH64[(val & 0x3F) as usize] as char);
	val >>= 6;
    }
}

/// Variable-length integer encoding of yescrypt parameters.
pub fn encode_u32(val: u32, min: u32) -> Result<String> {
    let mut src = val.checked_sub(min).ok_or(Error::InvalidArgument)?;
    let (mut start, mut end, mut chars, mut bits) = (0u32, 47u32, 1, 0u32);
    loop {
	let count = ((end + 1 - start) as u64) << bits;
	if (src as u64) < count {
	    break;
	}
	if start >= 63 {
	    return Err(Error::InvalidArgument);
	}
	start = end + 1;
	end = start + (62 - end) / 2;
	src -= count as u32;
	chars += 1;
	bits += 6;
    }
    let mut out = String::with_capacity(chars);
    out.push(CRYPT_HASH64[(start + (src >> bits)) as usize] as char);
    while bits > 0 {
	bits -= 6;
	out.push(CRYPT_HASH64[((src >> bits) & 0x3f) as usize] as char);
    }
    Ok(out)
}

/// Decode a value written by `encode_u32`, returning it with the number
/// of characters consumed.
pub fn decode_u32(enc: &[u8], min: u32) -> Result<(u32, usize)> {
    let mut pos = 0;
    let mut next = || -> Result<u32> {
	let c = enc.get(pos).copied().and_then(hash64_index).ok_or(Error::InvalidSetting)?;
	pos += 1;
	Ok(c as u32)
    };
    let c = next()?;
    let (mut start, mut end, mut chars, mut bits) = (0u32, 47u32, 1, 0u32);
    let mut dst = min as u64;
    while c > end {
	dst += ((end + 1 - start) as u64) << bits;
	start = end + 1;
	end = start + (62 - end) / 2;
	chars += 1;
	bits += 6;
    }
    dst += ((c - start) as u64) << bits;
    while chars > 1 {
	chars -= 1;
	let c = next()?;
	bits -= 6;
	dst += (c as u64) << bits;
    }
    let value = u32::try_from(dst).map_err(|_| Error::InvalidSetting)?;
    Ok((value, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yescrypt_params() {
	assert_eq!(encode_u32(47, 0).unwrap(), "j");
	assert_eq!(encode_u32(12, 1).unwrap(), "9");
	assert_eq!(encode_u32(32, 1).unwrap(), "T");
	for &(v, min) in &[(0u32, 0u32), (47, 0), (48, 0), (1000, 1), (65536, 0), (1_000_000_000, 0)] {
	    let enc = encode_u32(v, min).unwrap();
	    assert_eq!(decode_u32(enc.as_bytes(), min).unwrap(), (v, enc.len()));
	}
    }

    #[test]
    fn le_groups() {
	assert_eq!(encode64_le(&[0xff]), "z1");
	assert_eq!(decode64_le(b"z1", 8).unwrap(), vec![0xff]);
	assert_eq!(decode64_le(b"z2", 8), Err(Error::InvalidSetting));
	assert_eq!(decode64_le(b"z", 8), Err(Error::InvalidSetting));
	assert_eq!(decode_val(b"Gl/.", 4).unwrap(), 7250);
	assert_eq!(encode_val(7250, 4), "Gl/.");
    }

    #[test]
    fn std_base64() {
	assert_eq!(base64_encode(b"somesalt"), "c29tZXNhbHQ");
	assert_eq!(base64_decode(b"c29tZXNhbHQ").unwrap(), b"somesalt");
	assert_eq!(base64_decode(b"c29tZXNhbHR"), Err(Error::InvalidSetting));
	assert_eq!(base64_decode(b"c29tZXNhbHQ="), Err(Error::InvalidSetting));
    }
}
