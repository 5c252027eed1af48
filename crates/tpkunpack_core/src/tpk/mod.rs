mod assemble;
mod bytes;
mod codec;
mod encode;
mod error;
mod file;
mod frame;
mod header;
mod pipeline;
mod record;

/// Frame sequence assembly into static images or animations.
pub use assemble::{Animation, Artifact, DEFAULT_FRAME_DURATION_MS, assemble};
/// Bounded byte cursor and its configuration.
pub use bytes::{Cursor, Endianness, LengthPrefix, TPK_BYTE_ORDER};
/// Image codec boundary.
pub use codec::{Codec, DecodedImage};
/// Animation encoder boundary.
pub use encode::AnimationEncoder;
/// Error and result aliases.
pub use error::{Result, TpkError};
/// Container file handle and record inspection.
pub use file::{RecordSummary, TpkFile};
/// Frame reconstruction entry points.
pub use frame::{ReconstructedFrame, reconstruct_frames};
/// Container header representation.
pub use header::{RecordRange, SUPPORTED_VERSIONS, TPK_MAGIC, TpkHeader};
/// Parallel extraction pipeline types.
pub use pipeline::{ExtractOptions, ExtractReport, ExtractedSprite, FailureMode, Pipeline, SpriteFailure, SpriteOutcome, Stage};
/// Sprite record and frame metadata types.
pub use record::{CanvasSize, FrameDescriptor, Point, Rect, SpriteRecord};
