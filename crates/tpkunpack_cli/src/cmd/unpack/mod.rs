use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use tpkunpack::tpk::{
	Codec, DEFAULT_FRAME_DURATION_MS, ExtractOptions, FailureMode, Pipeline, Result, SpriteOutcome, TpkError, TpkFile,
};

use crate::cmd::codec::{self, CodecChoice, DEFAULT_DECODER};
use crate::cmd::encode::GifEncoder;
use crate::cmd::export::export_sprite;
use crate::cmd::util::emit_json;

/// Stage label for failures while writing files.
const EXPORT_STAGE: &str = "export";

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(short, long, default_value = "output")]
	pub output: PathBuf,
	#[arg(short, long)]
	pub keep_blob: bool,
	#[arg(short, long)]
	pub extract_frames: bool,
	#[arg(short, long)]
	pub atlas: bool,
	#[arg(long, default_value_t = DEFAULT_FRAME_DURATION_MS, value_parser = clap::value_parser!(u32).range(1..))]
	pub default_duration: u32,
	#[arg(long)]
	pub fail_fast: bool,
	#[arg(long, value_enum, default_value_t = CodecChoice::Auto)]
	pub codec: CodecChoice,
	#[arg(long, default_value = DEFAULT_DECODER)]
	pub decoder: PathBuf,
	#[arg(short, long)]
	pub jobs: Option<usize>,
	#[arg(long)]
	pub json: bool,
}

/// Extract every sprite of a container into the output directory.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		output,
		keep_blob,
		extract_frames,
		atlas,
		default_duration,
		fail_fast,
		codec: codec_choice,
		decoder,
		jobs,
		json,
	} = args;

	let options = ExtractOptions {
		extract_frames,
		default_frame_duration: default_duration,
		failure_mode: if fail_fast { FailureMode::FailFast } else { FailureMode::CollectErrors },
		keep_blob,
		keep_atlas: atlas,
		jobs,
	};
	let codec = codec::build(codec_choice, decoder);
	let summary = unpack_into(&path, &output, codec.as_ref(), options)?;

	if json {
		emit_json(&summary);
	} else {
		print_summary(&summary);
	}

	if summary.failed > 0 {
		return Err(TpkError::IncompleteExtraction {
			failed: summary.failed,
			total: summary.sprites.len(),
		});
	}
	Ok(())
}

/// Run the pipeline over `path` and write every extracted sprite below `output`.
pub(crate) fn unpack_into(path: &Path, output: &Path, codec: &dyn Codec, options: ExtractOptions) -> Result<UnpackSummary> {
	let file = TpkFile::open(path)?;
	fs::create_dir_all(output)?;

	let report = Pipeline::new(codec, &GifEncoder, options).run(&file)?;

	let mut sprites = Vec::with_capacity(report.outcomes.len());
	for outcome in &report.outcomes {
		let row = match outcome {
			SpriteOutcome::Extracted(sprite) => match export_sprite(sprite, &report, output) {
				Ok(files) => {
					info!("sprite {} ({}) -> {} files", sprite.index, sprite.name, files.len());
					SpriteRow {
						index: sprite.index,
						name: sprite.name.clone(),
						status: "extracted",
						stage: None,
						error_kind: None,
						error: None,
						files: files.iter().map(|file| display_relative(file, output)).collect(),
					}
				}
				Err(err) => {
					warn!("sprite {} ({}) failed during {EXPORT_STAGE}: {err}", sprite.index, sprite.name);
					SpriteRow::failed(sprite.index, &sprite.name, EXPORT_STAGE, &err)
				}
			},
			SpriteOutcome::Failed(failure) => SpriteRow::failed(failure.index, &failure.name, failure.stage.as_str(), &failure.error),
		};
		sprites.push(row);
	}

	let failed = sprites.iter().filter(|row| row.error.is_some()).count();
	Ok(UnpackSummary {
		path: path.display().to_string(),
		output: output.display().to_string(),
		version: report.version,
		extracted: sprites.len() - failed,
		failed,
		sprites,
	})
}

fn display_relative(file: &Path, output: &Path) -> String {
	file.strip_prefix(output).unwrap_or(file).display().to_string()
}

fn print_summary(summary: &UnpackSummary) {
	println!("path: {}", summary.path);
	println!("output: {}", summary.output);
	println!("version: {}", summary.version);
	for row in &summary.sprites {
		match (&row.stage, &row.error) {
			(Some(stage), Some(error)) => println!("  [{}] {} FAILED at {stage}: {error}", row.index, row.name),
			_ => println!("  [{}] {} -> {}", row.index, row.name, row.files.join(", ")),
		}
	}
	println!("extracted: {}, failed: {}", summary.extracted, summary.failed);
}

#[derive(Debug, Serialize)]
pub(crate) struct SpriteRow {
	pub(crate) index: usize,
	pub(crate) name: String,
	pub(crate) status: &'static str,
	pub(crate) stage: Option<&'static str>,
	pub(crate) error_kind: Option<&'static str>,
	pub(crate) error: Option<String>,
	pub(crate) files: Vec<String>,
}

impl SpriteRow {
	fn failed(index: usize, name: &str, stage: &'static str, error: &TpkError) -> Self {
		Self {
			index,
			name: name.to_owned(),
			status: "failed",
			stage: Some(stage),
			error_kind: Some(error.kind()),
			error: Some(error.to_string()),
			files: Vec::new(),
		}
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct UnpackSummary {
	pub(crate) path: String,
	pub(crate) output: String,
	pub(crate) version: u16,
	pub(crate) sprites: Vec<SpriteRow>,
	pub(crate) extracted: usize,
	pub(crate) failed: usize,
}

#[cfg(test)]
mod tests;
