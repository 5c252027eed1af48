use crate::tpk::{Result, TpkError};

/// Byte order of every multi-byte field in a TPK container.
pub const TPK_BYTE_ORDER: Endianness = Endianness::Little;

/// Byte order used when widening raw bytes into integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian byte order.
	Little,
	/// Big-endian byte order.
	Big,
}

/// Width of the length field in front of a length-prefixed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
	/// One-byte length.
	U8,
	/// Two-byte length.
	U16,
	/// Four-byte length.
	U32,
}

/// Simple bounded cursor over an immutable byte slice.
///
/// Reads advance the position only when they succeed, so a failed read can be
/// retried after a `seek`.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	endianness: Endianness,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0 using the container byte order.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self::with_endianness(bytes, TPK_BYTE_ORDER)
	}

	/// Create a cursor at position 0 with an explicit byte order.
	pub fn with_endianness(bytes: &'a [u8], endianness: Endianness) -> Self {
		Self { bytes, pos: 0, endianness }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return total buffer length.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Return whether the underlying buffer is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute offset in `[0, len]`.
	pub fn seek(&mut self, offset: usize) -> Result<()> {
		if offset > self.bytes.len() {
			return Err(TpkError::InvalidOffset {
				offset,
				len: self.bytes.len(),
			});
		}

		self.pos = offset;
		Ok(())
	}

	/// Return up to `n` unread bytes without advancing.
	pub fn peek(&self, n: usize) -> &'a [u8] {
		let end = self.pos + n.min(self.remaining());
		&self.bytes[self.pos..end]
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(TpkError::OutOfBounds {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		self.read_array()
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		let [byte] = self.read_array()?;
		Ok(byte)
	}

	/// Read a `u16` in the cursor byte order.
	pub fn read_u16(&mut self) -> Result<u16> {
		let buf = self.read_array()?;
		Ok(match self.endianness {
			Endianness::Little => u16::from_le_bytes(buf),
			Endianness::Big => u16::from_be_bytes(buf),
		})
	}

	/// Read a `u32` in the cursor byte order.
	pub fn read_u32(&mut self) -> Result<u32> {
		let buf = self.read_array()?;
		Ok(match self.endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read a `u64` in the cursor byte order.
	pub fn read_u64(&mut self) -> Result<u64> {
		let buf = self.read_array()?;
		Ok(match self.endianness {
			Endianness::Little => u64::from_le_bytes(buf),
			Endianness::Big => u64::from_be_bytes(buf),
		})
	}

	/// Read an IEEE-754 `f32` in the cursor byte order.
	pub fn read_f32(&mut self) -> Result<f32> {
		self.read_u32().map(f32::from_bits)
	}

	/// Read a length field of the given width, then that many bytes.
	pub fn read_length_prefixed(&mut self, prefix: LengthPrefix) -> Result<&'a [u8]> {
		let start = self.pos;
		let len = match prefix {
			LengthPrefix::U8 => usize::from(self.read_u8()?),
			LengthPrefix::U16 => usize::from(self.read_u16()?),
			LengthPrefix::U32 => self.read_u32()? as usize,
		};

		match self.read_exact(len) {
			Ok(body) => Ok(body),
			Err(err) => {
				self.pos = start;
				Err(err)
			}
		}
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}
}
