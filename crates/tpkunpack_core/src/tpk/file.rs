use std::fs;
use std::path::Path;

use crate::tpk::bytes::Cursor;
use crate::tpk::{RecordRange, Result, SpriteRecord, TpkHeader};

/// Immutable container buffer with its validated header.
pub struct TpkFile {
	/// Parsed header and record table.
	pub header: TpkHeader,
	bytes: Vec<u8>,
}

impl TpkFile {
	/// Read and validate a container from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let bytes = fs::read(path)?;
		Self::from_bytes(bytes)
	}

	/// Validate an in-memory container.
	pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
		let header = TpkHeader::parse(Cursor::new(&bytes))?;
		Ok(Self { header, bytes })
	}

	/// Whole container buffer.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Number of declared records.
	pub fn record_count(&self) -> usize {
		self.header.records.len()
	}

	/// Byte slice of one record.
	pub fn record_bytes(&self, index: usize) -> Option<&[u8]> {
		let range = self.header.records.get(index)?;
		self.bytes.get(range.offset..range.end())
	}

	/// Byte slices of every record in declaration order.
	pub fn record_slices(&self) -> Vec<&[u8]> {
		self.header.records.iter().map(|range| &self.bytes[range.offset..range.end()]).collect()
	}

	/// Parse every record without decoding images.
	pub fn inspect(&self) -> Vec<RecordSummary> {
		self.header
			.records
			.iter()
			.zip(self.record_slices())
			.enumerate()
			.map(|(index, (range, bytes))| RecordSummary {
				index,
				range: *range,
				record: SpriteRecord::parse(bytes),
			})
			.collect()
	}
}

/// Parse result for one record, as listed by [`TpkFile::inspect`].
#[derive(Debug)]
pub struct RecordSummary {
	/// Declaration index.
	pub index: usize,
	/// Byte range inside the container.
	pub range: RecordRange,
	/// Parsed record or its failure.
	pub record: Result<SpriteRecord>,
}
