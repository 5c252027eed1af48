//! Shared test helpers for workspace crates: synthetic `.tpk` containers and image blobs.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

/// Size of the fixed container prefix (magic, version, flags, count).
pub const HEADER_PREFIX_SIZE: usize = 12;
/// Size of one record table entry.
pub const TABLE_ENTRY_SIZE: usize = 8;
/// Size of one serialized frame descriptor.
pub const FRAME_DESCRIPTOR_SIZE: usize = 16;
/// Magic prefix of [`raw_rgba_blob`] payloads.
pub const RAW_BLOB_MAGIC: &[u8; 4] = b"RAW0";

/// One frame descriptor as written into a record's frame table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpec {
	/// Source x in the atlas.
	pub x: u16,
	/// Source y in the atlas.
	pub y: u16,
	/// Upright frame width.
	pub width: u16,
	/// Upright frame height.
	pub height: u16,
	/// Target x on the canvas.
	pub offset_x: u16,
	/// Target y on the canvas.
	pub offset_y: u16,
	/// Duration in milliseconds.
	pub duration: u16,
	/// Raw flag bits.
	pub flags: u16,
}

impl FrameSpec {
	/// Frame at `(x, y)` with size `width x height`, placed at the canvas origin.
	pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
		Self {
			x,
			y,
			width,
			height,
			offset_x: 0,
			offset_y: 0,
			duration: 0,
			flags: 0,
		}
	}

	/// Set the canvas placement.
	pub fn at(mut self, offset_x: u16, offset_y: u16) -> Self {
		self.offset_x = offset_x;
		self.offset_y = offset_y;
		self
	}

	/// Set the duration in milliseconds.
	pub fn duration(mut self, duration: u16) -> Self {
		self.duration = duration;
		self
	}

	/// Mark the frame as stored rotated in the atlas.
	pub fn rotated(mut self) -> Self {
		self.flags |= 1;
		self
	}

	fn write(&self, out: &mut Vec<u8>) {
		for value in [
			self.x,
			self.y,
			self.width,
			self.height,
			self.offset_x,
			self.offset_y,
			self.duration,
			self.flags,
		] {
			out.extend_from_slice(&value.to_le_bytes());
		}
	}
}

/// One sprite record before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
	/// Sprite name.
	pub name: String,
	/// Canvas width.
	pub canvas_width: u16,
	/// Canvas height.
	pub canvas_height: u16,
	/// Atlas scale.
	pub scale: f32,
	/// Frame table.
	pub frames: Vec<FrameSpec>,
	/// Embedded compressed image.
	pub blob: Vec<u8>,
	/// Frame count written to the record, when it should disagree with `frames`.
	pub declared_frame_count: Option<u16>,
}

impl RecordSpec {
	/// Record with no frames yet.
	pub fn new(name: &str, canvas_width: u16, canvas_height: u16, blob: Vec<u8>) -> Self {
		Self {
			name: name.to_owned(),
			canvas_width,
			canvas_height,
			scale: 1.0,
			frames: Vec::new(),
			blob,
			declared_frame_count: None,
		}
	}

	/// Append a frame descriptor.
	pub fn frame(mut self, frame: FrameSpec) -> Self {
		self.frames.push(frame);
		self
	}

	/// Override the atlas scale.
	pub fn scale(mut self, scale: f32) -> Self {
		self.scale = scale;
		self
	}

	/// Write a frame count that disagrees with the frame table.
	pub fn declare_frames(mut self, count: u16) -> Self {
		self.declared_frame_count = Some(count);
		self
	}

	/// Serialize the record.
	pub fn to_bytes(&self) -> Vec<u8> {
		let name = self.name.as_bytes();
		let fixed = 2 + name.len() + 2 + 2 + 4 + 4 + 4 + 2;
		let blob_offset = fixed + self.frames.len() * FRAME_DESCRIPTOR_SIZE;
		let frame_count = self.declared_frame_count.unwrap_or(self.frames.len() as u16);

		let mut out = Vec::with_capacity(blob_offset + self.blob.len());
		out.extend_from_slice(&(name.len() as u16).to_le_bytes());
		out.extend_from_slice(name);
		out.extend_from_slice(&self.canvas_width.to_le_bytes());
		out.extend_from_slice(&self.canvas_height.to_le_bytes());
		out.extend_from_slice(&self.scale.to_le_bytes());
		out.extend_from_slice(&(blob_offset as u32).to_le_bytes());
		out.extend_from_slice(&(self.blob.len() as u32).to_le_bytes());
		out.extend_from_slice(&frame_count.to_le_bytes());
		for frame in &self.frames {
			frame.write(&mut out);
		}
		out.extend_from_slice(&self.blob);
		out
	}
}

/// Builder for whole containers.
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
	magic: [u8; 4],
	version: u16,
	flags: u16,
	records: Vec<Vec<u8>>,
	table: Option<Vec<(u32, u32)>>,
}

impl Default for ContainerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ContainerBuilder {
	/// Valid `TPK1` version 1 container with no records.
	pub fn new() -> Self {
		Self {
			magic: *b"TPK1",
			version: 1,
			flags: 0,
			records: Vec::new(),
			table: None,
		}
	}

	/// Override the magic bytes.
	pub fn magic(mut self, magic: [u8; 4]) -> Self {
		self.magic = magic;
		self
	}

	/// Override the version field.
	pub fn version(mut self, version: u16) -> Self {
		self.version = version;
		self
	}

	/// Override the reserved flags.
	pub fn flags(mut self, flags: u16) -> Self {
		self.flags = flags;
		self
	}

	/// Append a record.
	pub fn record(self, record: RecordSpec) -> Self {
		self.raw_record(record.to_bytes())
	}

	/// Append raw record bytes.
	pub fn raw_record(mut self, bytes: Vec<u8>) -> Self {
		self.records.push(bytes);
		self
	}

	/// Write this table instead of the computed one. Record bytes are still laid out back to back.
	pub fn table(mut self, table: Vec<(u32, u32)>) -> Self {
		self.table = Some(table);
		self
	}

	/// Computed `(offset, size)` table for the records added so far.
	pub fn computed_table(&self) -> Vec<(u32, u32)> {
		let count = self.table.as_ref().map_or(self.records.len(), Vec::len);
		let mut offset = HEADER_PREFIX_SIZE + count * TABLE_ENTRY_SIZE;
		self.records
			.iter()
			.map(|record| {
				let entry = (offset as u32, record.len() as u32);
				offset += record.len();
				entry
			})
			.collect()
	}

	/// Serialize the container.
	pub fn build(&self) -> Vec<u8> {
		let table = self.table.clone().unwrap_or_else(|| self.computed_table());

		let mut out = Vec::new();
		out.extend_from_slice(&self.magic);
		out.extend_from_slice(&self.version.to_le_bytes());
		out.extend_from_slice(&self.flags.to_le_bytes());
		out.extend_from_slice(&(table.len() as u32).to_le_bytes());
		for (offset, size) in table {
			out.extend_from_slice(&offset.to_le_bytes());
			out.extend_from_slice(&size.to_le_bytes());
		}
		for record in &self.records {
			out.extend_from_slice(record);
		}
		out
	}
}

/// Opaque pixel that encodes its own coordinates.
pub fn coord_pixel(x: u32, y: u32) -> [u8; 4] {
	[x as u8, y as u8, (x >> 8) as u8 ^ 0x5a, 0xff]
}

/// RGBA image filled by `pixel`.
pub fn image_with(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> RgbaImage {
	RgbaImage::from_fn(width, height, |x, y| image::Rgba(pixel(x, y)))
}

/// PNG-encoded blob.
pub fn png_blob(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
	let mut out = Cursor::new(Vec::new());
	image_with(width, height, pixel)
		.write_to(&mut out, ImageFormat::Png)
		.expect("png encoding into memory succeeds");
	out.into_inner()
}

/// Uncompressed `RAW0` blob: magic, `u32` width, `u32` height, RGBA rows.
pub fn raw_rgba_blob(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(RAW_BLOB_MAGIC);
	out.extend_from_slice(&width.to_le_bytes());
	out.extend_from_slice(&height.to_le_bytes());
	out.extend_from_slice(image_with(width, height, pixel).as_raw());
	out
}

/// Decode a [`raw_rgba_blob`] payload.
pub fn decode_raw_rgba(blob: &[u8]) -> Option<RgbaImage> {
	let rest = blob.strip_prefix(RAW_BLOB_MAGIC.as_slice())?;
	let width = u32::from_le_bytes(rest.get(0..4)?.try_into().ok()?);
	let height = u32::from_le_bytes(rest.get(4..8)?.try_into().ok()?);
	RgbaImage::from_raw(width, height, rest.get(8..)?.to_vec())
}
