use thiserror::Error;

use crate::tpk::Rect;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, TpkError>;

/// Errors produced while reading, reconstructing, and exporting `.tpk` data.
#[derive(Debug, Error)]
pub enum TpkError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("out of bounds read at offset {at}, need {need} bytes, remaining {rem}")]
	OutOfBounds {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Seek target lies outside the buffer.
	#[error("invalid offset {offset} (buffer length {len})")]
	InvalidOffset {
		/// Requested absolute offset.
		offset: usize,
		/// Buffer length.
		len: usize,
	},
	/// Leading magic or version is not a known TPK layout.
	#[error("unsupported container format (magic={magic:?}, version={version:?})")]
	UnsupportedFormat {
		/// First up-to-4 bytes of the buffer.
		magic: [u8; 4],
		/// Parsed version, when the magic matched.
		version: Option<u16>,
	},
	/// Record table cannot be trusted.
	#[error("malformed header: {reason}")]
	MalformedHeader {
		/// What was wrong with the table.
		reason: String,
	},
	/// One sprite record is inconsistent.
	#[error("malformed record: {reason}")]
	MalformedRecord {
		/// What was wrong with the record.
		reason: String,
	},
	/// Frame source rectangle exceeds the decoded atlas.
	#[error("frame {frame} source {rect} exceeds decoded image {image_width}x{image_height}")]
	FrameOutOfBounds {
		/// Frame index within its sprite.
		frame: usize,
		/// Atlas footprint of the frame.
		rect: Rect,
		/// Decoded image width.
		image_width: u32,
		/// Decoded image height.
		image_height: u32,
	},
	/// External image codec rejected the embedded blob.
	#[error("codec failure: {reason}")]
	CodecFailure {
		/// Codec-provided description.
		reason: String,
	},
	/// External animation encoder failed.
	#[error("encode failure: {reason}")]
	EncodeFailure {
		/// Encoder-provided description.
		reason: String,
	},
	/// Fail-fast run aborted on a sprite failure.
	#[error("sprite {index} ({name}) failed: {source}")]
	SpriteFailed {
		/// Declaration index of the failed sprite.
		index: usize,
		/// Sprite label.
		name: String,
		/// Underlying failure.
		#[source]
		source: Box<TpkError>,
	},
	/// Worker pool could not be created.
	#[error("thread pool: {reason}")]
	ThreadPool {
		/// Builder error text.
		reason: String,
	},
	/// Run finished but some sprites failed.
	#[error("{failed} of {total} sprites failed")]
	IncompleteExtraction {
		/// Failed sprite count.
		failed: usize,
		/// Total sprite count.
		total: usize,
	},
}

impl TpkError {
	/// Stable snake_case label for summaries.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Io(_) => "io",
			Self::OutOfBounds { .. } => "out_of_bounds",
			Self::InvalidOffset { .. } => "invalid_offset",
			Self::UnsupportedFormat { .. } => "unsupported_format",
			Self::MalformedHeader { .. } => "malformed_header",
			Self::MalformedRecord { .. } => "malformed_record",
			Self::FrameOutOfBounds { .. } => "frame_out_of_bounds",
			Self::CodecFailure { .. } => "codec_failure",
			Self::EncodeFailure { .. } => "encode_failure",
			Self::SpriteFailed { .. } => "sprite_failed",
			Self::ThreadPool { .. } => "thread_pool",
			Self::IncompleteExtraction { .. } => "incomplete_extraction",
		}
	}

	/// Whether this error invalidates the whole container rather than one sprite.
	pub fn is_container_level(&self) -> bool {
		matches!(self, Self::UnsupportedFormat { .. } | Self::MalformedHeader { .. })
	}

	pub(crate) fn malformed_header(reason: impl Into<String>) -> Self {
		Self::MalformedHeader { reason: reason.into() }
	}

	pub(crate) fn malformed_record(reason: impl Into<String>) -> Self {
		Self::MalformedRecord { reason: reason.into() }
	}
}
