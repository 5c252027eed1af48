use std::path::{Path, PathBuf};

use tpkunpack::tpk::{ExtractOptions, ExtractReport, Pipeline, TpkFile};
use tpkunpack_testkit::{ContainerBuilder, FrameSpec, RecordSpec, coord_pixel, png_blob};

use crate::cmd::codec::ImageCodec;
use crate::cmd::encode::GifEncoder;

/// Container with a static sprite `still` (8x8) and a two-frame sprite `blink` (4x4).
pub(crate) fn sample_container() -> Vec<u8> {
	ContainerBuilder::new()
		.record(RecordSpec::new("still", 8, 8, png_blob(8, 8, coord_pixel)).scale(0.5).frame(FrameSpec::new(0, 0, 8, 8)))
		.record(
			RecordSpec::new("blink", 4, 4, png_blob(8, 4, coord_pixel))
				.frame(FrameSpec::new(0, 0, 4, 4).duration(80))
				.frame(FrameSpec::new(4, 0, 2, 2).at(1, 1)),
		)
		.build()
}

pub(crate) fn write_container(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("container written");
	path
}

pub(crate) fn extract(bytes: Vec<u8>, options: ExtractOptions) -> ExtractReport {
	let file = TpkFile::from_bytes(bytes).expect("container parses");
	Pipeline::new(&ImageCodec, &GifEncoder, options).run(&file).expect("run completes")
}
