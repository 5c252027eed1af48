use image::RgbaImage;

use crate::tpk::Result;

/// Atlas pixels as produced by a [`Codec`].
pub type DecodedImage = RgbaImage;

/// Decoder for the compressed image embedded in each sprite record.
///
/// Implementations report failures as [`TpkError::CodecFailure`](crate::tpk::TpkError::CodecFailure).
/// They are shared across worker threads, so decoding must not rely on `&mut` state.
pub trait Codec: Sync {
	/// Decode one compressed blob into RGBA pixels.
	fn decode(&self, blob: &[u8]) -> Result<DecodedImage>;
}

impl<F> Codec for F
where
	F: Fn(&[u8]) -> Result<DecodedImage> + Sync,
{
	fn decode(&self, blob: &[u8]) -> Result<DecodedImage> {
		self(blob)
	}
}
