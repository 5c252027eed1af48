#![allow(missing_docs)]

use image::Rgba;
use tpkunpack::tpk::{Animation, AnimationEncoder, Artifact, DecodedImage, ExtractOptions, Pipeline, Result, TpkError, TpkFile};
use tpkunpack_testkit::{ContainerBuilder, FrameSpec, RecordSpec, coord_pixel, decode_raw_rgba, raw_rgba_blob};

struct NullEncoder;

impl AnimationEncoder for NullEncoder {
	fn encode_animation(&self, _animation: &Animation) -> Result<Vec<u8>> {
		Ok(Vec::new())
	}

	fn extension(&self) -> &'static str {
		"bin"
	}
}

fn raw_codec(blob: &[u8]) -> Result<DecodedImage> {
	decode_raw_rgba(blob).ok_or_else(|| TpkError::CodecFailure {
		reason: "not a RAW0 blob".to_owned(),
	})
}

#[test]
fn static_and_animated_sprites_from_one_container() {
	let sprite_a = RecordSpec::new("A", 32, 32, raw_rgba_blob(32, 32, coord_pixel)).frame(FrameSpec::new(0, 0, 32, 32).at(0, 0).duration(0));
	let sprite_b = RecordSpec::new("B", 16, 16, raw_rgba_blob(32, 16, coord_pixel))
		.frame(FrameSpec::new(0, 0, 16, 16).at(0, 0).duration(100))
		.frame(FrameSpec::new(16, 0, 16, 16).at(0, 0).duration(100));
	let bytes = ContainerBuilder::new().record(sprite_a).record(sprite_b).build();
	assert_eq!(&bytes[..4], b"TPK1");

	let file = TpkFile::from_bytes(bytes).expect("container parses");
	assert_eq!(file.header.version, 1);
	assert_eq!(file.record_count(), 2);

	let report = Pipeline::new(&raw_codec, &NullEncoder, ExtractOptions::default()).run(&file).expect("run completes");
	assert!(!report.has_failures());

	let sprites: Vec<_> = report.extracted().collect();
	assert_eq!(sprites.len(), 2);

	assert_eq!(sprites[0].name, "A");
	let Artifact::Static(image) = &sprites[0].artifact else {
		panic!("sprite A should be static");
	};
	assert_eq!(image.dimensions(), (32, 32));
	assert!(sprites[0].encoded.is_none());

	assert_eq!(sprites[1].name, "B");
	let Artifact::Animation(animation) = &sprites[1].artifact else {
		panic!("sprite B should be animated");
	};
	assert_eq!(animation.frames.len(), 2);
	for frame in &animation.frames {
		assert_eq!(frame.image.dimensions(), (16, 16));
		assert_eq!(frame.duration, 100);
	}
	assert_eq!(*animation.frames[0].image.get_pixel(0, 0), Rgba(coord_pixel(0, 0)));
	assert_eq!(*animation.frames[1].image.get_pixel(0, 0), Rgba(coord_pixel(16, 0)));
	assert!(sprites[1].encoded.is_some());
}

#[test]
fn inspect_lists_records_without_decoding() {
	let bytes = ContainerBuilder::new()
		.record(RecordSpec::new("hero", 8, 8, b"not decoded".to_vec()).scale(2.0).frame(FrameSpec::new(0, 0, 8, 8)))
		.raw_record(vec![0; 5])
		.build();
	let file = TpkFile::from_bytes(bytes).expect("container parses");

	let summaries = file.inspect();
	assert_eq!(summaries.len(), 2);

	let first = summaries[0].record.as_ref().expect("first record parses");
	assert_eq!(first.name, "hero");
	assert_eq!(first.scale, 2.0);
	assert_eq!(first.blob, b"not decoded");
	assert_eq!(summaries[1].range.size, 5);
	assert!(summaries[1].record.is_err());
}

#[test]
fn open_reads_from_disk() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = dir.path().join("empty.tpk");
	std::fs::write(&path, ContainerBuilder::new().build()).expect("write fixture");

	let file = TpkFile::open(&path).expect("file opens");
	assert_eq!(file.record_count(), 0);

	let missing = TpkFile::open(dir.path().join("missing.tpk")).err().expect("file is absent");
	assert!(matches!(missing, TpkError::Io(_)));
}
