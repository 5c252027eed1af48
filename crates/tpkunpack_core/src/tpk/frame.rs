use image::{RgbaImage, imageops};

use crate::tpk::record::validate_frame;
use crate::tpk::{CanvasSize, DecodedImage, FrameDescriptor, Result, TpkError};

/// One canvas-sized frame ready for assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedFrame {
	/// Full canvas pixels, transparent outside the placed region.
	pub image: RgbaImage,
	/// Declared duration in milliseconds; `0` until assembly applies the default.
	pub duration: u32,
}

/// Slice every frame out of the decoded atlas and place it on its own canvas.
///
/// Output order is descriptor order; repeated descriptors yield repeated frames.
pub fn reconstruct_frames(canvas: CanvasSize, frames: &[FrameDescriptor], atlas: &DecodedImage) -> Result<Vec<ReconstructedFrame>> {
	frames
		.iter()
		.enumerate()
		.map(|(index, frame)| reconstruct_frame(index, canvas, frame, atlas))
		.collect()
}

fn reconstruct_frame(index: usize, canvas: CanvasSize, frame: &FrameDescriptor, atlas: &DecodedImage) -> Result<ReconstructedFrame> {
	let footprint = frame.atlas_rect();
	if !footprint.fits_within(atlas.width(), atlas.height()) {
		return Err(TpkError::FrameOutOfBounds {
			frame: index,
			rect: footprint,
			image_width: atlas.width(),
			image_height: atlas.height(),
		});
	}
	validate_frame(index, frame, canvas)?;

	let region = imageops::crop_imm(atlas, footprint.x, footprint.y, footprint.width, footprint.height).to_image();
	// Packed rotated frames sit 90° clockwise in the atlas.
	let region = if frame.rotated { imageops::rotate270(&region) } else { region };

	let mut image = RgbaImage::new(canvas.width, canvas.height);
	imageops::replace(&mut image, &region, i64::from(frame.offset.x), i64::from(frame.offset.y));

	Ok(ReconstructedFrame {
		image,
		duration: frame.duration,
	})
}
