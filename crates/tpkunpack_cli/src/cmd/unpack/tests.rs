use tpkunpack::tpk::{ExtractOptions, FailureMode, TpkError};
use tpkunpack_testkit::{ContainerBuilder, FrameSpec, RecordSpec, coord_pixel, png_blob};

use crate::cmd::codec::ImageCodec;
use crate::cmd::test_support::{sample_container, write_container};
use crate::cmd::unpack::unpack_into;

#[test]
fn writes_every_sprite_and_creates_output_dir() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = write_container(dir.path(), "sample.tpk", &sample_container());
	let output = dir.path().join("nested").join("out");

	let summary = unpack_into(&path, &output, &ImageCodec, ExtractOptions::default()).expect("unpack succeeds");

	assert_eq!((summary.extracted, summary.failed), (2, 0));
	assert_eq!(summary.sprites[0].files, vec!["still.png", "still.json"]);
	assert_eq!(summary.sprites[1].files, vec!["blink.gif", "blink.json"]);
	for name in ["still.png", "still.json", "blink.gif", "blink.json"] {
		assert!(output.join(name).is_file(), "{name} missing");
	}
}

#[test]
fn sprite_failures_are_reported_with_stage() {
	let bytes = ContainerBuilder::new()
		.record(RecordSpec::new("ok", 4, 4, png_blob(4, 4, coord_pixel)).frame(FrameSpec::new(0, 0, 4, 4)))
		.record(RecordSpec::new("corrupt", 4, 4, b"not an image".to_vec()).frame(FrameSpec::new(0, 0, 4, 4)))
		.build();
	let dir = tempfile::tempdir().expect("tempdir");
	let path = write_container(dir.path(), "partial.tpk", &bytes);

	let summary = unpack_into(&path, dir.path(), &ImageCodec, ExtractOptions::default()).expect("run completes");

	assert_eq!((summary.extracted, summary.failed), (1, 1));
	let row = &summary.sprites[1];
	assert_eq!(row.name, "corrupt");
	assert_eq!(row.status, "failed");
	assert_eq!(row.stage, Some("decode"));
	assert_eq!(row.error_kind, Some("codec_failure"));
	assert!(row.files.is_empty());
	assert!(dir.path().join("ok.png").is_file());
}

#[test]
fn export_errors_become_failures() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = write_container(dir.path(), "sample.tpk", &sample_container());
	let output = dir.path().join("out");
	std::fs::create_dir_all(output.join("still.png")).expect("blocking directory");

	let summary = unpack_into(&path, &output, &ImageCodec, ExtractOptions::default()).expect("run completes");

	assert_eq!(summary.failed, 1);
	assert_eq!(summary.sprites[0].stage, Some("export"));
	assert_eq!(summary.sprites[1].status, "extracted");
}

#[test]
fn fail_fast_aborts_before_writing() {
	let bytes = ContainerBuilder::new()
		.record(RecordSpec::new("corrupt", 4, 4, b"garbage".to_vec()).frame(FrameSpec::new(0, 0, 4, 4)))
		.build();
	let dir = tempfile::tempdir().expect("tempdir");
	let path = write_container(dir.path(), "bad.tpk", &bytes);
	let output = dir.path().join("out");
	let options = ExtractOptions {
		failure_mode: FailureMode::FailFast,
		..ExtractOptions::default()
	};

	let err = unpack_into(&path, &output, &ImageCodec, options).expect_err("fail-fast");

	assert!(matches!(err, TpkError::SpriteFailed { index: 0, ref name, .. } if name == "corrupt"));
	assert_eq!(std::fs::read_dir(&output).map(|entries| entries.count()).unwrap_or(0), 0);
}

#[test]
fn container_errors_stop_before_output_is_created() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = write_container(dir.path(), "bad.tpk", &ContainerBuilder::new().magic(*b"NOPE").build());
	let output = dir.path().join("out");

	let err = unpack_into(&path, &output, &ImageCodec, ExtractOptions::default()).expect_err("bad magic");

	assert!(matches!(err, TpkError::UnsupportedFormat { .. }));
	assert!(!output.exists());
}
