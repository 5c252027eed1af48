use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::tpk::record::fallback_name;
use crate::tpk::{
	AnimationEncoder, Artifact, CanvasSize, Codec, DEFAULT_FRAME_DURATION_MS, DecodedImage, FrameDescriptor, Result, SpriteRecord, TpkError, TpkFile, assemble,
	reconstruct_frames,
};

/// What a run does after a sprite fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
	/// Keep going and report every failure at the end.
	#[default]
	CollectErrors,
	/// Stop scheduling work and fail the run on the first sprite error.
	FailFast,
}

/// Caller-owned switches for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
	/// Export every frame as its own image as well.
	pub extract_frames: bool,
	/// Duration in milliseconds for frames that declare `0`.
	pub default_frame_duration: u32,
	/// Failure policy.
	pub failure_mode: FailureMode,
	/// Keep each sprite's compressed blob on the result.
	pub keep_blob: bool,
	/// Keep each sprite's decoded atlas on the result.
	pub keep_atlas: bool,
	/// Worker thread count; `None` uses the global rayon pool.
	pub jobs: Option<usize>,
}

impl Default for ExtractOptions {
	fn default() -> Self {
		Self {
			extract_frames: false,
			default_frame_duration: DEFAULT_FRAME_DURATION_MS,
			failure_mode: FailureMode::CollectErrors,
			keep_blob: false,
			keep_atlas: false,
			jobs: None,
		}
	}
}

/// Per-sprite processing step, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	/// Record sub-header and frame table parsing.
	Parse,
	/// Embedded image decoding through the codec.
	Decode,
	/// Frame slicing and placement.
	Reconstruct,
	/// Static/animation assembly.
	Assemble,
	/// Animation encoding.
	Encode,
}

impl Stage {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Parse => "parse",
			Self::Decode => "decode",
			Self::Reconstruct => "reconstruct",
			Self::Assemble => "assemble",
			Self::Encode => "encode",
		}
	}
}

/// Successfully processed sprite.
#[derive(Debug, Clone)]
pub struct ExtractedSprite {
	/// Declaration index.
	pub index: usize,
	/// Display name.
	pub name: String,
	/// Filesystem-safe, run-unique output stem.
	pub stem: String,
	/// Canvas size.
	pub canvas: CanvasSize,
	/// Atlas scale metadata.
	pub scale: f32,
	/// Frame metadata as declared.
	pub frames: Vec<FrameDescriptor>,
	/// Assembled output.
	pub artifact: Artifact,
	/// Encoded animation payload for multi-frame sprites.
	pub encoded: Option<Vec<u8>>,
	/// Compressed blob, when requested.
	pub blob: Option<Vec<u8>>,
	/// Decoded atlas, when requested.
	pub atlas: Option<DecodedImage>,
}

/// Failure of one sprite, tagged with where it happened.
#[derive(Debug)]
pub struct SpriteFailure {
	/// Declaration index.
	pub index: usize,
	/// Display name, or the index fallback when the record did not parse.
	pub name: String,
	/// Step that failed.
	pub stage: Stage,
	/// Underlying error.
	pub error: TpkError,
}

/// Result slot for one sprite.
#[derive(Debug)]
pub enum SpriteOutcome {
	/// Sprite extracted.
	Extracted(Box<ExtractedSprite>),
	/// Sprite failed.
	Failed(SpriteFailure),
}

impl SpriteOutcome {
	/// Declaration index of the sprite.
	pub fn index(&self) -> usize {
		match self {
			Self::Extracted(sprite) => sprite.index,
			Self::Failed(failure) => failure.index,
		}
	}

	/// Display name of the sprite.
	pub fn name(&self) -> &str {
		match self {
			Self::Extracted(sprite) => &sprite.name,
			Self::Failed(failure) => &failure.name,
		}
	}
}

/// Outcomes of a whole run, in declaration order.
#[derive(Debug)]
pub struct ExtractReport {
	/// Container version.
	pub version: u16,
	/// Whether loose frame images were requested.
	pub extract_frames: bool,
	/// Duration applied to frames that declare `0`.
	pub default_frame_duration: u32,
	/// Extension of encoded animations.
	pub animation_extension: &'static str,
	/// One outcome per record.
	pub outcomes: Vec<SpriteOutcome>,
}

impl ExtractReport {
	/// Successful sprites in declaration order.
	pub fn extracted(&self) -> impl Iterator<Item = &ExtractedSprite> {
		self.outcomes.iter().filter_map(|outcome| match outcome {
			SpriteOutcome::Extracted(sprite) => Some(sprite.as_ref()),
			SpriteOutcome::Failed(_) => None,
		})
	}

	/// Failures in declaration order.
	pub fn failures(&self) -> impl Iterator<Item = &SpriteFailure> {
		self.outcomes.iter().filter_map(|outcome| match outcome {
			SpriteOutcome::Failed(failure) => Some(failure),
			SpriteOutcome::Extracted(_) => None,
		})
	}

	/// Whether any sprite failed.
	pub fn has_failures(&self) -> bool {
		self.failures().next().is_some()
	}
}

/// Parallel per-sprite extraction: parse, decode, reconstruct, assemble, encode.
pub struct Pipeline<'a> {
	codec: &'a dyn Codec,
	encoder: &'a dyn AnimationEncoder,
	options: ExtractOptions,
}

impl<'a> Pipeline<'a> {
	/// Pipeline over the given boundaries.
	pub fn new(codec: &'a dyn Codec, encoder: &'a dyn AnimationEncoder, options: ExtractOptions) -> Self {
		Self { codec, encoder, options }
	}

	/// Active options.
	pub fn options(&self) -> &ExtractOptions {
		&self.options
	}

	/// Process every record of `file`.
	///
	/// Container-level problems were already rejected by [`TpkFile`]. Sprite
	/// failures are collected, unless [`FailureMode::FailFast`] turns the first
	/// one (in declaration order) into [`TpkError::SpriteFailed`].
	pub fn run(&self, file: &TpkFile) -> Result<ExtractReport> {
		let slices = file.record_slices();
		info!("extracting {} sprites (container version {})", slices.len(), file.header.version);

		let abort = AtomicBool::new(false);
		let slots = match self.options.jobs {
			Some(jobs) => {
				let pool = rayon::ThreadPoolBuilder::new()
					.num_threads(jobs)
					.build()
					.map_err(|err| TpkError::ThreadPool { reason: err.to_string() })?;
				pool.install(|| self.process_all(&slices, &abort))
			}
			None => self.process_all(&slices, &abort),
		};

		let mut outcomes: Vec<SpriteOutcome> = slots.into_iter().flatten().collect();

		if self.options.failure_mode == FailureMode::FailFast
			&& let Some(position) = outcomes.iter().position(|outcome| matches!(outcome, SpriteOutcome::Failed(_)))
			&& let SpriteOutcome::Failed(failure) = outcomes.swap_remove(position)
		{
			return Err(TpkError::SpriteFailed {
				index: failure.index,
				name: failure.name,
				source: Box::new(failure.error),
			});
		}

		assign_stems(&mut outcomes);

		let report = ExtractReport {
			version: file.header.version,
			extract_frames: self.options.extract_frames,
			default_frame_duration: self.options.default_frame_duration,
			animation_extension: self.encoder.extension(),
			outcomes,
		};
		info!(
			"extracted {} of {} sprites",
			report.extracted().count(),
			report.outcomes.len()
		);
		Ok(report)
	}

	fn process_all(&self, slices: &[&[u8]], abort: &AtomicBool) -> Vec<Option<SpriteOutcome>> {
		slices
			.par_iter()
			.enumerate()
			.map(|(index, bytes)| {
				let outcome = self.process_record(index, bytes, abort)?;
				if let SpriteOutcome::Failed(failure) = &outcome {
					warn!("sprite {index} ({}) failed during {}: {}", failure.name, failure.stage.as_str(), failure.error);
					if self.options.failure_mode == FailureMode::FailFast {
						abort.store(true, Ordering::Relaxed);
					}
				}
				Some(outcome)
			})
			.collect()
	}

	fn process_record(&self, index: usize, bytes: &[u8], abort: &AtomicBool) -> Option<SpriteOutcome> {
		if abort.load(Ordering::Relaxed) {
			return None;
		}

		let record = match SpriteRecord::parse(bytes) {
			Ok(record) => record,
			Err(error) => {
				return Some(SpriteOutcome::Failed(SpriteFailure {
					index,
					name: fallback_name(index),
					stage: Stage::Parse,
					error,
				}));
			}
		};
		let name = record.display_name(index);
		debug!("sprite {index} ({name}): parsed {} frames on {}x{} canvas", record.frames.len(), record.canvas.width, record.canvas.height);

		match self.finish(index, &name, record, abort) {
			Ok(Some(sprite)) => Some(SpriteOutcome::Extracted(Box::new(sprite))),
			Ok(None) => None,
			Err((stage, error)) => Some(SpriteOutcome::Failed(SpriteFailure { index, name, stage, error })),
		}
	}

	fn finish(
		&self,
		index: usize,
		name: &str,
		record: SpriteRecord,
		abort: &AtomicBool,
	) -> std::result::Result<Option<ExtractedSprite>, (Stage, TpkError)> {
		let SpriteRecord {
			canvas, scale, frames, blob, ..
		} = record;

		if abort.load(Ordering::Relaxed) {
			return Ok(None);
		}
		let atlas = self.codec.decode(&blob).map_err(|err| (Stage::Decode, err))?;
		debug!("sprite {index} ({name}): decoded {}x{} atlas", atlas.width(), atlas.height());
		let blob = self.options.keep_blob.then_some(blob);

		if abort.load(Ordering::Relaxed) {
			return Ok(None);
		}
		let reconstructed = reconstruct_frames(canvas, &frames, &atlas).map_err(|err| (Stage::Reconstruct, err))?;
		let atlas = self.options.keep_atlas.then_some(atlas);

		let artifact = assemble(reconstructed, self.options.default_frame_duration).map_err(|err| (Stage::Assemble, err))?;

		let encoded = match &artifact {
			Artifact::Static(_) => None,
			Artifact::Animation(animation) => {
				if abort.load(Ordering::Relaxed) {
					return Ok(None);
				}
				Some(self.encoder.encode_animation(animation).map_err(|err| (Stage::Encode, err))?)
			}
		};
		debug!("sprite {index} ({name}): assembled {} frames", artifact.frame_count());

		Ok(Some(ExtractedSprite {
			index,
			name: name.to_owned(),
			stem: String::new(),
			canvas,
			scale,
			frames,
			artifact,
			encoded,
			blob,
			atlas,
		}))
	}
}

/// Filesystem-safe form of a sprite name.
///
/// Only `[A-Za-z0-9_-]` survive, so a stem never contains the dot that starts
/// its file extensions.
pub(crate) fn file_stem(name: &str) -> String {
	let stem: String = name
		.chars()
		.map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') { ch } else { '_' })
		.collect();
	if stem.is_empty() { "sprite".to_owned() } else { stem }
}

/// Give every extracted sprite a stem no other sprite's files can clash with.
///
/// Names shared by several sprites get `_<index>` appended. Stems are then
/// handed out in declaration order, each one claiming itself and its loose
/// frame names (`<stem>_NNNN`); a taken candidate gets a counter suffix.
/// Comparison ignores ASCII case.
fn assign_stems(outcomes: &mut [SpriteOutcome]) {
	let mut seen: HashMap<String, usize> = HashMap::new();
	for outcome in outcomes.iter() {
		*seen.entry(file_stem(outcome.name()).to_ascii_lowercase()).or_insert(0) += 1;
	}

	let mut claimed: HashSet<String> = HashSet::new();
	for outcome in outcomes.iter_mut() {
		let SpriteOutcome::Extracted(sprite) = outcome else {
			continue;
		};

		let base = file_stem(&sprite.name);
		let shared = seen.get(&base.to_ascii_lowercase()).copied().unwrap_or(0) > 1;
		let preferred = if shared { format!("{base}_{}", sprite.index) } else { base };
		let frame_count = sprite.artifact.frame_count();

		let names_for = |stem: &str| {
			let mut names = vec![stem.to_ascii_lowercase()];
			names.extend((0..frame_count).map(|frame| format!("{stem}_{frame:04}").to_ascii_lowercase()));
			names
		};

		let mut stem = preferred.clone();
		let mut attempt = 1_usize;
		while names_for(&stem).iter().any(|name| claimed.contains(name)) {
			stem = format!("{preferred}_{attempt}");
			attempt += 1;
		}
		if stem != preferred {
			debug!("sprite {} ({}): stem {preferred} is taken, using {stem}", sprite.index, sprite.name);
		}

		claimed.extend(names_for(&stem));
		sprite.stem = stem;
	}
}
