use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use tpkunpack::tpk::{Artifact, ExtractReport, ExtractedSprite, FrameDescriptor, Rect, Result, TpkError};

/// Extension for kept blobs the `image` crate cannot identify.
const RAW_BLOB_EXTENSION: &str = "jxr";

/// Write every file for one sprite and return the paths written.
pub fn export_sprite(sprite: &ExtractedSprite, report: &ExtractReport, dir: &Path) -> Result<Vec<PathBuf>> {
	let mut written = Vec::new();

	match (&sprite.artifact, &sprite.encoded) {
		(Artifact::Static(image), _) => {
			let path = dir.join(format!("{}.png", sprite.stem));
			save_png(image, &path)?;
			written.push(path);
		}
		(Artifact::Animation(_), Some(payload)) => {
			let path = dir.join(format!("{}.{}", sprite.stem, report.animation_extension));
			fs::write(&path, payload)?;
			written.push(path);
		}
		(Artifact::Animation(_), None) => {
			return Err(TpkError::EncodeFailure {
				reason: format!("animation for {} was not encoded", sprite.name),
			});
		}
	}

	if report.extract_frames {
		for (index, image) in sprite.artifact.frame_images().into_iter().enumerate() {
			let path = dir.join(frame_file_name(&sprite.stem, index));
			save_png(image, &path)?;
			written.push(path);
		}
	}

	let path = dir.join(format!("{}.json", sprite.stem));
	let sheet = SheetJson::from_sprite(sprite, report.default_frame_duration);
	let text = serde_json::to_string_pretty(&sheet).map_err(|err| TpkError::EncodeFailure {
		reason: format!("cannot render metadata: {err}"),
	})?;
	fs::write(&path, text)?;
	written.push(path);

	if let Some(atlas) = &sprite.atlas {
		let path = dir.join(format!("{}.atlas.png", sprite.stem));
		save_png(atlas, &path)?;
		written.push(path);
	}

	if let Some(blob) = &sprite.blob {
		let extension = image::guess_format(blob)
			.ok()
			.and_then(|format| format.extensions_str().first().copied())
			.unwrap_or(RAW_BLOB_EXTENSION);
		let path = dir.join(format!("{}.blob.{extension}", sprite.stem));
		fs::write(&path, blob)?;
		written.push(path);
	}

	Ok(written)
}

/// Name of a loose frame image.
pub(crate) fn frame_file_name(stem: &str, index: usize) -> String {
	format!("{stem}_{index:04}.png")
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
	image.save_with_format(path, ImageFormat::Png).map_err(|err| TpkError::EncodeFailure {
		reason: format!("cannot write {}: {err}", path.display()),
	})
}

#[derive(Serialize)]
struct SizeJson {
	w: u32,
	h: u32,
}

#[derive(Serialize)]
struct RectJson {
	x: u32,
	y: u32,
	w: u32,
	h: u32,
}

impl From<Rect> for RectJson {
	fn from(rect: Rect) -> Self {
		Self {
			x: rect.x,
			y: rect.y,
			w: rect.width,
			h: rect.height,
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameJson {
	filename: String,
	frame: RectJson,
	rotated: bool,
	trimmed: bool,
	sprite_source_size: RectJson,
	source_size: SizeJson,
	duration: u32,
}

#[derive(Serialize)]
struct SheetJson {
	name: String,
	scale: f32,
	frames: Vec<FrameJson>,
}

impl SheetJson {
	fn from_sprite(sprite: &ExtractedSprite, default_duration: u32) -> Self {
		let canvas = sprite.canvas;
		let frames = sprite
			.frames
			.iter()
			.enumerate()
			.map(|(index, frame)| frame_json(&sprite.stem, index, frame, canvas.width, canvas.height, default_duration))
			.collect();

		Self {
			name: sprite.name.clone(),
			scale: sprite.scale,
			frames,
		}
	}
}

fn frame_json(stem: &str, index: usize, frame: &FrameDescriptor, canvas_width: u32, canvas_height: u32, default_duration: u32) -> FrameJson {
	let target = frame.target_rect();
	FrameJson {
		filename: frame_file_name(stem, index),
		frame: frame.atlas_rect().into(),
		rotated: frame.rotated,
		trimmed: target.width != canvas_width || target.height != canvas_height,
		sprite_source_size: target.into(),
		source_size: SizeJson {
			w: canvas_width,
			h: canvas_height,
		},
		duration: if frame.duration == 0 { default_duration } else { frame.duration },
	}
}
