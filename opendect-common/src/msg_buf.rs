//! Fixed-capacity message buffer
//!
//! `MsgBuf` carries one NWK-layer message between the socket layer, the
//! transaction layer and the S-format codec. It is a fixed-capacity byte
//! container with a head offset so that link headers can be pulled off the
//! front without copying, and a `msg_type` tag holding the decoded
//! message-type octet once the transaction layer has consumed the header.
//!
//! The buffer implements [`bytes::Buf`] (reading consumes from the front)
//! and [`bytes::BufMut`] (writing appends at the tail), which are the codec
//! traits used by the S-format IE handlers.

use bytes::buf::UninitSlice;
use bytes::{Buf, BufMut};

use crate::error::Error;

/// Maximum size of one NWK-layer message.
pub const MSG_BUF_CAPACITY: usize = 768;

/// Fixed-capacity message buffer with front-pull semantics.
#[derive(Clone)]
pub struct MsgBuf {
    data: [u8; MSG_BUF_CAPACITY],
    head: usize,
    len: usize,
    /// Decoded message-type octet, valid once the link header was pulled.
    pub msg_type: u8,
}

impl Default for MsgBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgBuf {
    /// Creates an empty message buffer.
    pub fn new() -> Self {
        Self {
            data: [0; MSG_BUF_CAPACITY],
            head: 0,
            len: 0,
            msg_type: 0,
        }
    }

    /// Creates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let mut mb = Self::new();
        mb.append(data)?;
        Ok(mb)
    }

    /// Number of message bytes currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no message bytes are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remaining tail capacity.
    pub fn tailroom(&self) -> usize {
        MSG_BUF_CAPACITY - self.head - self.len
    }

    /// The message bytes.
    pub fn slice(&self) -> &[u8] {
        &self.data[self.head..self.head + self.len]
    }

    /// Appends `data` at the tail.
    pub fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() > self.tailroom() {
            return Err(Error::Buffer(format!(
                "append of {} bytes exceeds tailroom {}",
                data.len(),
                self.tailroom()
            )));
        }
        let start = self.head + self.len;
        self.data[start..start + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    /// Appends a single octet at the tail.
    pub fn append_u8(&mut self, value: u8) -> Result<(), Error> {
        self.append(&[value])
    }

    /// Removes `n` bytes from the front and returns them.
    pub fn pull(&mut self, n: usize) -> Result<&[u8], Error> {
        if n > self.len {
            return Err(Error::Buffer(format!(
                "pull of {n} bytes underflows length {}",
                self.len
            )));
        }
        let start = self.head;
        self.head += n;
        self.len -= n;
        Ok(&self.data[start..start + n])
    }

    /// Resets the buffer to the empty state.
    pub fn reset(&mut self) {
        self.head = 0;
        self.len = 0;
        self.msg_type = 0;
    }
}

impl std::fmt::Debug for MsgBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MsgBuf {{ type: {:#04x}, len: {}, data: {} }}",
            self.msg_type,
            self.len,
            crate::logging::format_hex(self.slice())
        )
    }
}

impl Buf for MsgBuf {
    fn remaining(&self) -> usize {
        self.len
    }

    fn chunk(&self) -> &[u8] {
        self.slice()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.len, "advance past end of MsgBuf");
        self.head += cnt;
        self.len -= cnt;
    }
}

unsafe impl BufMut for MsgBuf {
    fn remaining_mut(&self) -> usize {
        self.tailroom()
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        assert!(cnt <= self.tailroom(), "advance past capacity of MsgBuf");
        self.len += cnt;
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        let start = self.head + self.len;
        UninitSlice::new(&mut self.data[start..])
    }
}
