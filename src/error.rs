//! Error values.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.
//!
//! The variants map onto the __errno__ values a C __crypt__(3)
//! implementation would set: `InvalidSetting` and `InvalidArgument`
//! correspond to `EINVAL`, `BufferTooSmall` and `PassphraseTooLong`
//! to `ERANGE`. Only entropy source failures carry a cause.
use std::fmt;
use std::error::Error as StdError;

/// Possible errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Random bytes cannot be obtained from the operating system.
    RandomError(String),
    /// The setting string is malformed or names no known method.
    InvalidSetting,
    /// A salt generation parameter (cost, random byte count) is out of range.
    InvalidArgument,
    /// The output buffer cannot hold the result.
    BufferTooSmall,
    /// The passphrase is longer than the supported maximum.
    PassphraseTooLong,
    /// The method is recognized, but not available in this build.
    AlgorithmDisabled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::RandomError(ref err) => write!(f, "{}", err),
            Error::InvalidSetting => write!(f, "Invalid setting string"),
            Error::InvalidArgument => write!(f, "Invalid salt generation argument"),
            Error::BufferTooSmall => write!(f, "Output buffer too small"),
            Error::PassphraseTooLong => write!(f, "Passphrase too long"),
            Error::AlgorithmDisabled => write!(f, "Hashing method disabled"),
        }
    }
}

impl StdError for Error {}
