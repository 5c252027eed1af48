use std::path::PathBuf;

use tpkunpack::tpk::{Codec, TpkError};
use tpkunpack_testkit::{coord_pixel, image_with, png_blob};

use crate::cmd::codec::{CodecChoice, ExternalCodec, ImageCodec, build};

fn missing_decoder() -> PathBuf {
	PathBuf::from("/nonexistent/tpkunpack/JXRDecApp")
}

#[test]
fn image_codec_decodes_png_blobs() {
	let blob = png_blob(5, 3, coord_pixel);
	let image = ImageCodec.decode(&blob).expect("png decodes");
	assert_eq!(image, image_with(5, 3, coord_pixel));
}

#[test]
fn image_codec_rejects_garbage() {
	let err = ImageCodec.decode(b"definitely not an image").expect_err("garbage");
	assert!(matches!(err, TpkError::CodecFailure { .. }));
}

#[test]
fn external_codec_reports_missing_program() {
	let codec = ExternalCodec::new(missing_decoder());
	let err = codec.decode(b"\x49\x49\xbc\x01").expect_err("decoder does not exist");
	assert!(matches!(err, TpkError::CodecFailure { reason } if reason.contains("cannot run")));
}

#[test]
fn auto_codec_decodes_known_formats_in_process() {
	let codec = build(CodecChoice::Auto, missing_decoder());
	let image = codec.decode(&png_blob(2, 2, coord_pixel)).expect("png stays in-process");
	assert_eq!(image.dimensions(), (2, 2));
}

#[test]
fn auto_codec_falls_back_to_external_decoder() {
	let codec = build(CodecChoice::Auto, missing_decoder());
	let err = codec.decode(b"\x49\x49\xbc\x01jxr").expect_err("unknown format goes external");
	assert!(matches!(err, TpkError::CodecFailure { reason } if reason.contains("JXRDecApp")));
}

#[cfg(unix)]
#[test]
fn external_codec_runs_decoder_and_loads_tiff_output() {
	use std::os::unix::fs::PermissionsExt;

	let dir = tempfile::tempdir().expect("tempdir");
	let expected = image_with(6, 3, coord_pixel);
	let tiff = dir.path().join("prepared.tif");
	expected.save_with_format(&tiff, image::ImageFormat::Tiff).expect("tiff written");

	let blob = b"\x49\x49\xbc\x01 fake jxr payload".to_vec();
	let received = dir.path().join("received.jxr");

	// Accepts only `-i <blob> -o <tiff>`, keeps a copy of its input.
	let script = dir.path().join("fake-decoder.sh");
	std::fs::write(
		&script,
		format!(
			"#!/bin/sh\n[ \"$1\" = \"-i\" ] && [ \"$3\" = \"-o\" ] || exit 2\ncp \"$2\" \"{}\"\ncp \"{}\" \"$4\"\n",
			received.display(),
			tiff.display()
		),
	)
	.expect("script written");
	std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("script made executable");

	let codec = ExternalCodec::new(script);
	let image = codec.decode(&blob).expect("external decode succeeds");
	assert_eq!(std::fs::read(&received).expect("decoder saw the blob"), blob);
	assert_eq!(image, expected);
}

#[cfg(unix)]
#[test]
fn external_codec_reports_decoder_exit_status() {
	use std::os::unix::fs::PermissionsExt;

	let dir = tempfile::tempdir().expect("tempdir");
	let script = dir.path().join("broken-decoder.sh");
	std::fs::write(&script, "#!/bin/sh\necho 'bad stream' >&2\nexit 7\n").expect("script written");
	std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("script made executable");

	let err = ExternalCodec::new(script).decode(b"\x49\x49\xbc\x01").expect_err("decoder fails");
	assert!(matches!(err, TpkError::CodecFailure { reason } if reason.contains("bad stream")));
}
