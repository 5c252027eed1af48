use crate::tpk::bytes::Cursor;
use crate::tpk::{Result, TpkError};

/// Leading signature of every TPK container.
pub const TPK_MAGIC: [u8; 4] = *b"TPK1";
/// Container versions this parser understands.
pub const SUPPORTED_VERSIONS: &[u16] = &[1];

/// Byte range of one sprite record inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRange {
	/// Absolute offset of the record's first byte.
	pub offset: usize,
	/// Record length in bytes.
	pub size: usize,
}

impl RecordRange {
	/// Exclusive end offset.
	pub fn end(self) -> usize {
		self.offset + self.size
	}
}

/// Parsed container header and record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpkHeader {
	/// Container format version.
	pub version: u16,
	/// Reserved flag bits, kept verbatim.
	pub flags: u16,
	/// Record byte ranges in declaration order.
	pub records: Vec<RecordRange>,
}

impl TpkHeader {
	/// Size of the fixed prefix before the record table.
	pub const PREFIX_SIZE: usize = 12;
	/// Size of one `(offset, size)` table entry.
	pub const TABLE_ENTRY_SIZE: usize = 8;

	/// Parse and validate the header from a cursor positioned at offset 0.
	pub fn parse(mut cursor: Cursor<'_>) -> Result<Self> {
		let buffer_len = cursor.len();
		let magic = cursor.read_code4().map_err(|_| TpkError::UnsupportedFormat {
			magic: first4(&cursor),
			version: None,
		})?;
		if magic != TPK_MAGIC {
			return Err(TpkError::UnsupportedFormat { magic, version: None });
		}

		let version = cursor.read_u16().map_err(|_| TpkError::malformed_header("truncated version field"))?;
		if !SUPPORTED_VERSIONS.contains(&version) {
			return Err(TpkError::UnsupportedFormat {
				magic,
				version: Some(version),
			});
		}

		let flags = cursor.read_u16().map_err(|_| TpkError::malformed_header("truncated flags field"))?;
		let count = cursor.read_u32().map_err(|_| TpkError::malformed_header("truncated record count"))? as usize;

		let table_len = count
			.checked_mul(Self::TABLE_ENTRY_SIZE)
			.ok_or_else(|| TpkError::malformed_header(format!("record count {count} overflows table size")))?;
		if table_len > cursor.remaining() {
			return Err(TpkError::malformed_header(format!(
				"record table of {count} entries needs {table_len} bytes, {} remain",
				cursor.remaining()
			)));
		}
		let header_size = Self::PREFIX_SIZE + table_len;

		let mut records = Vec::with_capacity(count);
		let mut prev_end = header_size;
		for index in 0..count {
			let offset = cursor.read_u32()? as usize;
			let size = cursor.read_u32()? as usize;

			if size == 0 {
				return Err(TpkError::malformed_header(format!("record {index} is empty")));
			}
			if offset < header_size {
				return Err(TpkError::malformed_header(format!(
					"record {index} at offset {offset} overlaps the header (size {header_size})"
				)));
			}
			let end = offset
				.checked_add(size)
				.filter(|end| *end <= buffer_len)
				.ok_or_else(|| TpkError::malformed_header(format!("record {index} range {offset}+{size} exceeds buffer length {buffer_len}")))?;
			if offset < prev_end {
				return Err(TpkError::malformed_header(format!(
					"record {index} at offset {offset} overlaps the previous record ending at {prev_end}"
				)));
			}

			records.push(RecordRange { offset, size });
			prev_end = end;
		}

		Ok(Self { version, flags, records })
	}

	/// Total header size including the record table.
	pub fn header_size(&self) -> usize {
		Self::PREFIX_SIZE + self.records.len() * Self::TABLE_ENTRY_SIZE
	}
}

fn first4(cursor: &Cursor<'_>) -> [u8; 4] {
	let head = cursor.peek(4);
	let mut magic = [0_u8; 4];
	magic[..head.len()].copy_from_slice(head);
	magic
}
