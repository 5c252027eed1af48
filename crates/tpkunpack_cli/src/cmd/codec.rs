use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use tpkunpack::tpk::{Codec, DecodedImage, Result, TpkError};

/// Default location of the external JPEG XR decoder.
pub const DEFAULT_DECODER: &str = ".native/JXRDecApp";

/// Codec adapter selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecChoice {
	/// In-process when the blob is a format the `image` crate knows, otherwise external.
	Auto,
	/// Always decode in-process.
	Image,
	/// Always run the external decoder.
	External,
}

/// Build the codec for `choice`.
pub fn build(choice: CodecChoice, decoder: PathBuf) -> Box<dyn Codec> {
	match choice {
		CodecChoice::Auto => Box::new(AutoCodec {
			external: ExternalCodec::new(decoder),
		}),
		CodecChoice::Image => Box::new(ImageCodec),
		CodecChoice::External => Box::new(ExternalCodec::new(decoder)),
	}
}

/// In-process decoding through the `image` crate.
pub struct ImageCodec;

impl Codec for ImageCodec {
	fn decode(&self, blob: &[u8]) -> Result<DecodedImage> {
		let image = image::load_from_memory(blob).map_err(|err| codec_failure(format!("in-process decode: {err}")))?;
		Ok(image.to_rgba8())
	}
}

/// Decoder binary invoked as `<program> -i <blob> -o <tiff>`.
pub struct ExternalCodec {
	program: PathBuf,
}

impl ExternalCodec {
	/// Adapter around `program`.
	pub fn new(program: PathBuf) -> Self {
		Self { program }
	}

	/// Decoder binary path.
	pub fn program(&self) -> &Path {
		&self.program
	}
}

impl Codec for ExternalCodec {
	fn decode(&self, blob: &[u8]) -> Result<DecodedImage> {
		// One scratch dir per call keeps parallel sprites apart.
		let scratch = tempfile::tempdir().map_err(|err| codec_failure(format!("cannot create scratch dir: {err}")))?;
		let input = scratch.path().join("atlas.jxr");
		let output = scratch.path().join("atlas.tif");
		fs::write(&input, blob).map_err(|err| codec_failure(format!("cannot stage blob: {err}")))?;

		debug!("running {} on {} byte blob", self.program.display(), blob.len());
		let result = Command::new(&self.program)
			.arg("-i")
			.arg(&input)
			.arg("-o")
			.arg(&output)
			.output()
			.map_err(|err| codec_failure(format!("cannot run {}: {err}", self.program.display())))?;
		if !result.status.success() {
			let stderr = String::from_utf8_lossy(&result.stderr);
			return Err(codec_failure(format!(
				"{} exited with {}: {}",
				self.program.display(),
				result.status,
				stderr.trim()
			)));
		}

		let image = image::open(&output).map_err(|err| codec_failure(format!("cannot read decoder output: {err}")))?;
		Ok(image.to_rgba8())
	}
}

/// Sniffs the blob and picks in-process or external decoding.
pub struct AutoCodec {
	external: ExternalCodec,
}

impl Codec for AutoCodec {
	fn decode(&self, blob: &[u8]) -> Result<DecodedImage> {
		if image::guess_format(blob).is_ok() {
			ImageCodec.decode(blob)
		} else {
			debug!("blob format not recognised, handing it to {}", self.external.program().display());
			self.external.decode(blob)
		}
	}
}

fn codec_failure(reason: String) -> TpkError {
	TpkError::CodecFailure { reason }
}

#[cfg(test)]
mod tests;
