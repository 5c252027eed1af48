use image::RgbaImage;

use crate::tpk::{ReconstructedFrame, Result, TpkError};

/// Duration applied to frames that declare `0`, unless the caller configures another.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Ordered frames with resolved durations, looping forever.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
	/// Canvas width shared by every frame.
	pub width: u32,
	/// Canvas height shared by every frame.
	pub height: u32,
	/// Frames in playback order with defaults already applied.
	pub frames: Vec<ReconstructedFrame>,
}

impl Animation {
	/// Sum of all frame durations in milliseconds.
	pub fn total_duration(&self) -> u64 {
		self.frames.iter().map(|frame| u64::from(frame.duration)).sum()
	}
}

/// Exportable result of one sprite.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
	/// Single-frame sprite.
	Static(RgbaImage),
	/// Multi-frame sprite.
	Animation(Animation),
}

impl Artifact {
	/// Number of frames carried.
	pub fn frame_count(&self) -> usize {
		match self {
			Self::Static(_) => 1,
			Self::Animation(animation) => animation.frames.len(),
		}
	}

	/// Every frame image in playback order.
	pub fn frame_images(&self) -> Vec<&RgbaImage> {
		match self {
			Self::Static(image) => vec![image],
			Self::Animation(animation) => animation.frames.iter().map(|frame| &frame.image).collect(),
		}
	}

	/// Canvas dimensions.
	pub fn dimensions(&self) -> (u32, u32) {
		match self {
			Self::Static(image) => image.dimensions(),
			Self::Animation(animation) => (animation.width, animation.height),
		}
	}
}

/// Turn reconstructed frames into a static image or an animation.
///
/// Zero durations become `default_duration`, used as given.
pub fn assemble(mut frames: Vec<ReconstructedFrame>, default_duration: u32) -> Result<Artifact> {
	let Some(first) = frames.first() else {
		return Err(TpkError::malformed_record("sprite has no frames to assemble"));
	};
	let (width, height) = first.image.dimensions();
	if let Some(index) = frames.iter().position(|frame| frame.image.dimensions() != (width, height)) {
		return Err(TpkError::malformed_record(format!(
			"frame {index} is {:?}, expected canvas {width}x{height}",
			frames[index].image.dimensions()
		)));
	}

	if frames.len() == 1 {
		let frame = frames.remove(0);
		return Ok(Artifact::Static(frame.image));
	}

	for frame in &mut frames {
		if frame.duration == 0 {
			frame.duration = default_duration;
		}
	}

	Ok(Artifact::Animation(Animation { width, height, frames }))
}

#[cfg(test)]
mod tests;
