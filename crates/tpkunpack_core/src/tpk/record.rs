use std::fmt;

use crate::tpk::bytes::{Cursor, LengthPrefix};
use crate::tpk::{Result, TpkError};

/// Serialized size of one frame descriptor.
pub const FRAME_DESCRIPTOR_SIZE: usize = 16;

const FLAG_ROTATED: u16 = 1;

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
	/// Left edge.
	pub x: u32,
	/// Top edge.
	pub y: u32,
	/// Width in pixels.
	pub width: u32,
	/// Height in pixels.
	pub height: u32,
}

impl Rect {
	/// Exclusive right edge.
	pub fn right(self) -> u64 {
		u64::from(self.x) + u64::from(self.width)
	}

	/// Exclusive bottom edge.
	pub fn bottom(self) -> u64 {
		u64::from(self.y) + u64::from(self.height)
	}

	/// Whether the rectangle lies inside a `width x height` area anchored at the origin.
	pub fn fits_within(self, width: u32, height: u32) -> bool {
		self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
	}
}

impl fmt::Display for Rect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
	}
}

/// Pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: u32,
	/// Vertical coordinate.
	pub y: u32,
}

/// Sprite canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
	/// Width in pixels.
	pub width: u32,
	/// Height in pixels.
	pub height: u32,
}

/// Placement and timing of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
	/// Upright source region in the decoded atlas.
	pub source: Rect,
	/// Top-left placement on the sprite canvas.
	pub offset: Point,
	/// Display time in milliseconds; `0` means the configured default.
	pub duration: u32,
	/// Stored rotated 90° clockwise in the atlas.
	pub rotated: bool,
}

impl FrameDescriptor {
	/// Region the frame actually occupies in the atlas.
	///
	/// Rotated frames occupy `height x width` pixels at the source position.
	pub fn atlas_rect(&self) -> Rect {
		if self.rotated {
			Rect {
				width: self.source.height,
				height: self.source.width,
				..self.source
			}
		} else {
			self.source
		}
	}

	/// Region the frame covers on the canvas.
	pub fn target_rect(&self) -> Rect {
		Rect {
			x: self.offset.x,
			y: self.offset.y,
			width: self.source.width,
			height: self.source.height,
		}
	}

	fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let x = cursor.read_u16()?;
		let y = cursor.read_u16()?;
		let width = cursor.read_u16()?;
		let height = cursor.read_u16()?;
		let offset_x = cursor.read_u16()?;
		let offset_y = cursor.read_u16()?;
		let duration = cursor.read_u16()?;
		let flags = cursor.read_u16()?;

		Ok(Self {
			source: Rect {
				x: u32::from(x),
				y: u32::from(y),
				width: u32::from(width),
				height: u32::from(height),
			},
			offset: Point {
				x: u32::from(offset_x),
				y: u32::from(offset_y),
			},
			duration: u32::from(duration),
			rotated: flags & FLAG_ROTATED != 0,
		})
	}
}

/// One sprite: canvas, frame table, and its still-compressed atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRecord {
	/// Name as stored; may be empty.
	pub name: String,
	/// Output canvas size.
	pub canvas: CanvasSize,
	/// Atlas scale factor carried as metadata.
	pub scale: f32,
	/// Frames in playback order.
	pub frames: Vec<FrameDescriptor>,
	/// Compressed atlas image.
	pub blob: Vec<u8>,
}

impl SpriteRecord {
	/// Parse one record from its own byte slice.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);

		let name = cursor.read_length_prefixed(LengthPrefix::U16)?;
		let name = std::str::from_utf8(name)
			.map_err(|err| TpkError::malformed_record(format!("sprite name is not utf-8: {err}")))?
			.to_owned();

		let canvas = CanvasSize {
			width: u32::from(cursor.read_u16()?),
			height: u32::from(cursor.read_u16()?),
		};
		if canvas.width == 0 || canvas.height == 0 {
			return Err(TpkError::malformed_record(format!("canvas {}x{} is empty", canvas.width, canvas.height)));
		}

		let scale = cursor.read_f32()?;
		if !scale.is_finite() || scale <= 0.0 {
			return Err(TpkError::malformed_record(format!("invalid atlas scale {scale}")));
		}

		let blob_offset = cursor.read_u32()? as usize;
		let blob_size = cursor.read_u32()? as usize;
		let frame_count = usize::from(cursor.read_u16()?);
		if frame_count == 0 {
			return Err(TpkError::malformed_record("sprite declares no frames"));
		}

		let table_start = cursor.pos();
		let table_len = blob_offset.checked_sub(table_start).ok_or_else(|| {
			TpkError::malformed_record(format!("blob offset {blob_offset} points inside the record header ending at {table_start}"))
		})?;
		if table_len != frame_count * FRAME_DESCRIPTOR_SIZE {
			return Err(TpkError::malformed_record(format!(
				"frame count {frame_count} needs a {} byte table, found {table_len} bytes before the blob",
				frame_count * FRAME_DESCRIPTOR_SIZE
			)));
		}

		if blob_size == 0 {
			return Err(TpkError::malformed_record("embedded image blob is empty"));
		}
		let blob_end = blob_offset
			.checked_add(blob_size)
			.filter(|end| *end <= bytes.len())
			.ok_or_else(|| TpkError::malformed_record(format!("blob {blob_offset}+{blob_size} exceeds record length {}", bytes.len())))?;

		let mut frames = Vec::with_capacity(frame_count);
		for index in 0..frame_count {
			let frame = FrameDescriptor::parse(&mut cursor)?;
			validate_frame(index, &frame, canvas)?;
			frames.push(frame);
		}

		Ok(Self {
			name,
			canvas,
			scale,
			frames,
			blob: bytes[blob_offset..blob_end].to_vec(),
		})
	}

	/// Stored name, or `sprite_<index>` when the record has none.
	pub fn display_name(&self, index: usize) -> String {
		if self.name.is_empty() { fallback_name(index) } else { self.name.clone() }
	}
}

pub(crate) fn fallback_name(index: usize) -> String {
	format!("sprite_{index:04}")
}

pub(crate) fn validate_frame(index: usize, frame: &FrameDescriptor, canvas: CanvasSize) -> Result<()> {
	if frame.source.width == 0 || frame.source.height == 0 {
		return Err(TpkError::malformed_record(format!("frame {index} has empty size {}", frame.source)));
	}

	let target = frame.target_rect();
	if !target.fits_within(canvas.width, canvas.height) {
		return Err(TpkError::malformed_record(format!(
			"frame {index} placed at {target} exceeds canvas {}x{}",
			canvas.width, canvas.height
		)));
	}

	Ok(())
}
