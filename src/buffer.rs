// Caller-owned output and scratch buffers.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use zeroize::Zeroize;
use crate::des_crypt::DesState;
use crate::error::Error;
use crate::unix::CRYPT_OUTPUT_SIZE;
use crate::yescrypt::YescryptBackend;
use super::Result;

/// Output buffer for the reentrant entry points.
///
/// The usable capacity can be restricted below the default of
/// `CRYPT_OUTPUT_SIZE` bytes, to model a short caller buffer. A result
/// (plus the terminating byte a C caller would need) must fit in the
/// capacity, otherwise the operation fails with `BufferTooSmall`.
pub struct CryptOutput {
    buf: [u8; CRYPT_OUTPUT_SIZE],
    cap: usize,
    len: usize,
}

impl CryptOutput {
    /// A buffer with the full capacity.
    pub fn new() -> CryptOutput {
	CryptOutput::with_capacity(CRYPT_OUTPUT_SIZE)
    }

    /// A buffer which accepts at most `cap` bytes, terminator included.
    /// The capacity is capped at `CRYPT_OUTPUT_SIZE`.
    pub fn with_capacity(cap: usize) -> CryptOutput {
	CryptOutput { buf: [0; CRYPT_OUTPUT_SIZE], cap: cap.min(CRYPT_OUTPUT_SIZE), len: 0 }
    }

    /// Usable capacity.
    pub fn capacity(&self) -> usize {
	self.cap
    }

    /// Current contents as bytes.
    pub fn as_bytes(&self) -> &[u8] {
	&self.buf[..self.len]
    }

    /// Current contents. Results and failure tokens are always ASCII.
    pub fn as_str(&self) -> &str {
	std::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    pub(crate) fn clear(&mut self) {
	self.buf[..self.len].zeroize();
	self.len = 0;
    }

    /// Store the failure token, which never equals `setting`'s own prefix.
    /// The token is cut to fit a buffer shorter than three bytes.
    pub(crate) fn fail(&mut self, setting: &str) {
	let token: &[u8] = if setting.starts_with("*0") { b"*1" } else { b"*0" };
	self.clear();
	let n = token.len().min(self.cap.saturating_sub(1));
	self.buf[..n].copy_from_slice(&token[..n]);
	self.len = n;
    }

    pub(crate) fn fill(&mut self, s: &str) -> Result<()> {
	if s.len() + 1 > self.cap {
	    return Err(Error::BufferTooSmall);
	}
	self.clear();
	self.buf[..s.len()].copy_from_slice(s.as_bytes());
	self.len = s.len();
	Ok(())
    }
}

impl Default for CryptOutput {
    fn default() -> Self {
	CryptOutput::new()
    }
}

impl fmt::Display for CryptOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	f.write_str(self.as_str())
    }
}

impl fmt::Debug for CryptOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	f.debug_struct("CryptOutput").field("cap", &self.cap).field("contents", &self.as_str()).finish()
    }
}

/// Per-call scratch state for the reentrant entry points.
///
/// Holds the DES tables, which are built on first use and reused while the
/// same `CryptData` is passed to subsequent calls, and the optional yescrypt
/// primitive. Key-dependent state is wiped after every call, and everything
/// is wiped when the value is dropped. A `CryptData` must not be shared
/// between concurrent calls; the borrow checker enforces this.
#[derive(Default)]
pub struct CryptData {
    des: Option<Box<DesState>>,
    yescrypt: Option<Arc<dyn YescryptBackend>>,
}

impl CryptData {
    /// Empty scratch state without a yescrypt primitive.
    pub fn new() -> CryptData {
	CryptData::default()
    }

    /// Attach the yescrypt primitive used by the `$y$` and `$gy$` methods.
    pub fn with_yescrypt<Y: YescryptBackend + 'static>(mut self, backend: Y) -> CryptData {
	self.yescrypt = Some(Arc::new(backend));
	self
    }

    pub(crate) fn des(&mut self) -> &mut DesState {
	self.des.get_or_insert_with(|| {
	    log::trace!("allocating DES state");
	    Box::new(DesState::new())
	})
    }

    pub(crate) fn yescrypt(&self) -> Option<&dyn YescryptBackend> {
	self.yescrypt.as_deref()
    }

    /// Borrow the scratch state for one hashing call.
    pub(crate) fn scratch(&mut self) -> Scratch<'_> {
	Scratch(self)
    }
}

impl fmt::Debug for CryptData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
	f.debug_struct("CryptData")
	    .field("des", &self.des.is_some())
	    .field("yescrypt", &self.yescrypt.is_some())
	    .finish()
    }
}

/// Scoped access to `CryptData` which wipes key material on exit.
pub(crate) struct Scratch<'a>(&'a mut CryptData);

impl<'a> Deref for Scratch<'a> {
    type Target = CryptData;

    fn deref(&self) -> &CryptData {
	&*self.0
    }
}

impl<'a> DerefMut for Scratch<'a> {
    fn deref_mut(&mut self) -> &mut CryptData {
	&mut *self.0
    }
}

impl<'a> Drop for Scratch<'a> {
    fn drop(&mut self) {
	if let Some(des) = self.0.des.as_mut() {
	    des.wipe_key();
	}
    }
}

#[cfg(test)]
mod tests {
    use super::CryptOutput;
    use crate::error::Error;

    #[test]
    fn failure_token() {
	let mut out = CryptOutput::new();
	out.fail("$1$abc");
	assert_eq!(out.as_str(), "*0");
	out.fail("*0");
	assert_eq!(out.as_str(), "*1");
	let mut short = CryptOutput::with_capacity(2);
	short.fail("");
	assert_eq!(short.as_str(), "*");
	let mut tiny = CryptOutput::with_capacity(1);
	tiny.fail("");
	assert_eq!(tiny.as_str(), "");
    }

    #[test]
    fn fill_respects_capacity() {
	let mut out = CryptOutput::with_capacity(14);
	assert_eq!(out.fill("aZGJuE6EXrjEE"), Ok(()));
	assert_eq!(out.as_str(), "aZGJuE6EXrjEE");
	let mut out = CryptOutput::with_capacity(13);
	out.fail("aZ");
	assert_eq!(out.fill("aZGJuE6EXrjEE"), Err(Error::BufferTooSmall));
	assert_eq!(out.as_str(), "*0");
    }
}
