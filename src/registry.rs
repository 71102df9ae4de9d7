// Hashing method registry.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use std::fmt;
use crate::bcrypt::BcryptVariant;
use crate::buffer::CryptData;
use crate::enc_dec::is_hash64_char;
use crate::error::Error;
use crate::{bcrypt, bigcrypt, bsdi_crypt, gost_yescrypt, md5_crypt, nthash, sha1_crypt,
    sha256_crypt, sha512_crypt, sun_md5, unix_crypt, yescrypt};
#[cfg(feature = "argon2")]
use crate::argon2_crypt;
#[cfg(feature = "scrypt")]
use crate::scrypt_crypt;
use super::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Argon2Variant {
    D,
    I,
    Id,
}

#[cfg(feature = "argon2")]
impl Argon2Variant {
    fn algorithm(self) -> argon2::Algorithm {
	match self {
	    Argon2Variant::D => argon2::Algorithm::Argon2d,
	    Argon2Variant::I => argon2::Algorithm::Argon2i,
	    Argon2Variant::Id => argon2::Algorithm::Argon2id,
	}
    }
}

/// A hashing method known to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Bcrypt(BcryptVariant),
    Md5,
    Sha256,
    Sha512,
    GostYescrypt,
    Yescrypt,
    Scrypt,
    Argon2(Argon2Variant),
    Argon2ds,
    Sha1,
    SunMd5,
    Nt,
    Bsdi,
    Des,
}

/// Matching order for settings.
const METHODS: [Method; 19] = [
    Method::Bcrypt(BcryptVariant::V2b),
    Method::Bcrypt(BcryptVariant::V2a),
    Method::Bcrypt(BcryptVariant::V2x),
    Method::Bcrypt(BcryptVariant::V2y),
    Method::Md5,
    Method::Sha256,
    Method::Sha512,
    Method::GostYescrypt,
    Method::Yescrypt,
    Method::Scrypt,
    Method::Argon2(Argon2Variant::D),
    Method::Argon2(Argon2Variant::I),
    Method::Argon2(Argon2Variant::Id),
    Method::Argon2ds,
    Method::Sha1,
    Method::SunMd5,
    Method::Nt,
    Method::Bsdi,
    Method::Des,
];

/// The method used when salt generation names none.
pub(crate) const PREFERRED: Method = Method::Bcrypt(BcryptVariant::V2b);

impl Method {
    pub fn prefix(self) -> &'static str {
	match self {
	    Method::Bcrypt(BcryptVariant::V2a) => "$2a$",
	    Method::Bcrypt(BcryptVariant::V2b) => "$2b$",
	    Method::Bcrypt(BcryptVariant::V2x) => "$2x$",
	    Method::Bcrypt(BcryptVariant::V2y) => "$2y$",
	    Method::Md5 => "$1$",
	    Method::Sha256 => "$5$",
	    Method::Sha512 => "$6$",
	    Method::GostYescrypt => "$gy$",
	    Method::Yescrypt => "$y$",
	    Method::Scrypt => "$7$",
	    Method::Argon2(Argon2Variant::D) => "$argon2d$",
	    Method::Argon2(Argon2Variant::I) => "$argon2i$",
	    Method::Argon2(Argon2Variant::Id) => "$argon2id$",
	    Method::Argon2ds => "$argon2ds$",
	    Method::Sha1 => "$sha1",
	    Method::SunMd5 => "$md5",
	    Method::Nt => "$3$",
	    Method::Bsdi => "_",
	    Method::Des => "",
	}
    }

    pub fn name(self) -> &'static str {
	match self {
	    Method::Bcrypt(BcryptVariant::V2a) => "bcrypt_a",
	    Method::Bcrypt(BcryptVariant::V2b) => "bcrypt",
	    Method::Bcrypt(BcryptVariant::V2x) => "bcrypt_x",
	    Method::Bcrypt(BcryptVariant::V2y) => "bcrypt_y",
	    Method::Md5 => "md5crypt",
	    Method::Sha256 => "sha256crypt",
	    Method::Sha512 => "sha512crypt",
	    Method::GostYescrypt => "gost_yescrypt",
	    Method::Yescrypt => "yescrypt",
	    Method::Scrypt => "scrypt",
	    Method::Argon2(Argon2Variant::D) => "argon2d",
	    Method::Argon2(Argon2Variant::I) => "argon2i",
	    Method::Argon2(Argon2Variant::Id) => "argon2id",
	    Method::Argon2ds => "argon2ds",
	    Method::Sha1 => "sha1crypt",
	    Method::SunMd5 => "sunmd5",
	    Method::Nt => "nt",
	    Method::Bsdi => "bsdicrypt",
	    Method::Des => "descrypt",
	}
    }

    /// Random bytes consumed by salt generation.
    pub fn nrbytes(self) -> usize {
	match self {
	    Method::Bcrypt(_) => bcrypt::NRBYTES,
	    Method::Md5 => 9,
	    Method::Sha256 | Method::Sha512 => 15,
	    Method::GostYescrypt => gost_yescrypt::NRBYTES,
	    Method::Yescrypt => yescrypt::NRBYTES,
	    Method::Scrypt | Method::Argon2(_) | Method::Argon2ds => 16,
	    Method::Sha1 => sha1_crypt::NRBYTES,
	    Method::SunMd5 => sun_md5::NRBYTES,
	    Method::Nt => 16,
	    Method::Bsdi => bsdi_crypt::NRBYTES,
	    Method::Des => 2,
	}
    }

    /// Whether new hashes of this method are considered safe.
    pub fn is_strong(self) -> bool {
	match self {
	    Method::Bcrypt(v) => v != BcryptVariant::V2x,
	    Method::Sha256 | Method::Sha512 | Method::GostYescrypt | Method::Yescrypt
		| Method::Scrypt | Method::Argon2(_) | Method::Argon2ds => true,
	    Method::Md5 | Method::Sha1 | Method::SunMd5 | Method::Nt | Method::Bsdi | Method::Des => false,
	}
    }

    /// Whether this build can compute the method.
    pub fn enabled(self) -> bool {
	match self {
	    Method::Argon2ds => false,
	    Method::Argon2(_) => cfg!(feature = "argon2"),
	    Method::Scrypt => cfg!(feature = "scrypt"),
	    m if !m.is_strong() => cfg!(feature = "weak-hashes"),
	    _ => true,
	}
    }

    fn matches(self, setting: &[u8]) -> bool {
	match self {
	    // A second character is examined only when the first one is valid.
	    Method::Des => match setting.first() {
		None => true,
		Some(&c0) => is_hash64_char(c0) && setting.get(1).map_or(false, |&c1| is_hash64_char(c1)),
	    },
	    m => setting.starts_with(m.prefix().as_bytes()),
	}
    }

    pub fn crypt(self, pass: &[u8], setting: &str, data: &mut CryptData) -> Result<String> {
	if !self.enabled() {
	    return Err(Error::AlgorithmDisabled);
	}
	match self {
	    Method::Bcrypt(_) => bcrypt::crypt(pass, setting),
	    Method::Md5 => md5_crypt::crypt(pass, setting),
	    Method::Sha256 => sha256_crypt::crypt(pass, setting),
	    Method::Sha512 => sha512_crypt::crypt(pass, setting),
	    Method::GostYescrypt => gost_yescrypt::crypt(pass, setting, data.yescrypt()),
	    Method::Yescrypt => yescrypt::crypt(pass, setting, data.yescrypt()),
	    #[cfg(feature = "scrypt")]
	    Method::Scrypt => scrypt_crypt::crypt(pass, setting),
	    #[cfg(feature = "argon2")]
	    Method::Argon2(v) => argon2_crypt::crypt(v.algorithm(), pass, setting),
	    Method::Sha1 => sha1_crypt::crypt(pass, setting),
	    Method::SunMd5 => sun_md5::crypt(pass, setting),
	    Method::Nt => nthash::crypt(pass, setting),
	    Method::Bsdi => bsdi_crypt::crypt(pass, setting, data.des()),
	    Method::Des => bigcrypt::crypt(pass, setting, data.des()),
	    #[allow(unreachable_patterns)]
	    _ => Err(Error::AlgorithmDisabled),
	}
    }

    pub fn gensalt(self, count: u64, rbytes: &[u8]) -> Result<String> {
	if !self.enabled() {
	    return Err(Error::AlgorithmDisabled);
	}
	match self {
	    Method::Bcrypt(v) => bcrypt::gensalt(v, count, rbytes),
	    Method::Md5 => md5_crypt::gensalt(count, rbytes),
	    Method::Sha256 => sha256_crypt::gensalt(count, rbytes),
	    Method::Sha512 => sha512_crypt::gensalt(count, rbytes),
	    Method::GostYescrypt => gost_yescrypt::gensalt(count, rbytes),
	    Method::Yescrypt => yescrypt::gensalt(count, rbytes),
	    #[cfg(feature = "scrypt")]
	    Method::Scrypt => scrypt_crypt::gensalt(count, rbytes),
	    #[cfg(feature = "argon2")]
	    Method::Argon2(v) => argon2_crypt::gensalt(v.algorithm(), count, rbytes),
	    Method::Sha1 => sha1_crypt::gensalt(count, rbytes),
	    Method::SunMd5 => sun_md5::gensalt(count, rbytes),
	    Method::Nt => nthash::gensalt(count, rbytes),
	    Method::Bsdi => bsdi_crypt::gensalt(count, rbytes),
	    Method::Des => unix_crypt::gensalt(count, rbytes),
	    #[allow(unreachable_patterns)]
	    _ => Err(Error::AlgorithmDisabled),
	}
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	f.write_str(self.name())
    }
}

/// The method a setting (or a salt generation prefix) belongs to.
pub(crate) fn find(setting: &str) -> Option<Method> {
    let sb = setting.as_bytes();
    METHODS.iter().copied().find(|m| m.matches(sb))
}
