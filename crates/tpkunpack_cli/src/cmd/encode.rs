use std::fmt::Display;

use tpkunpack::tpk::{Animation, AnimationEncoder, Result, TpkError};

/// Quantizer speed for `gif::Frame::from_rgba_speed` (1 = best, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Looping GIF encoder with restore-to-background disposal.
pub struct GifEncoder;

impl AnimationEncoder for GifEncoder {
	fn encode_animation(&self, animation: &Animation) -> Result<Vec<u8>> {
		let width = u16::try_from(animation.width).map_err(|_| encode_failure(format!("canvas width {} exceeds gif limit", animation.width)))?;
		let height = u16::try_from(animation.height).map_err(|_| encode_failure(format!("canvas height {} exceeds gif limit", animation.height)))?;

		let mut out = Vec::new();
		{
			let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).map_err(encode_failure)?;
			encoder.set_repeat(gif::Repeat::Infinite).map_err(encode_failure)?;

			for frame in &animation.frames {
				let mut pixels = frame.image.as_raw().clone();
				let mut gif_frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, QUANTIZE_SPEED);
				gif_frame.delay = delay_centis(frame.duration);
				gif_frame.dispose = gif::DisposalMethod::Background;
				encoder.write_frame(&gif_frame).map_err(encode_failure)?;
			}
		}

		Ok(out)
	}

	fn extension(&self) -> &'static str {
		"gif"
	}
}

/// Milliseconds to GIF centiseconds, rounded, never zero.
pub(crate) fn delay_centis(duration_ms: u32) -> u16 {
	let centis = duration_ms.saturating_add(5) / 10;
	u16::try_from(centis.max(1)).unwrap_or(u16::MAX)
}

fn encode_failure(err: impl Display) -> TpkError {
	TpkError::EncodeFailure { reason: err.to_string() }
}
