use image::RgbaImage;
use tpkunpack_testkit::{coord_pixel, image_with};

use crate::tpk::{Artifact, DEFAULT_FRAME_DURATION_MS, ReconstructedFrame, TpkError, assemble};

fn frame(width: u32, height: u32, duration: u32) -> ReconstructedFrame {
	ReconstructedFrame {
		image: image_with(width, height, coord_pixel),
		duration,
	}
}

#[test]
fn single_frame_becomes_static_image() {
	let artifact = assemble(vec![frame(32, 32, 0)], 100).expect("assembles");
	let Artifact::Static(image) = artifact else {
		panic!("expected static artifact");
	};
	assert_eq!(image.dimensions(), (32, 32));
}

#[test]
fn zero_duration_uses_configured_default_exactly() {
	let artifact = assemble(vec![frame(4, 4, 0), frame(4, 4, 40), frame(4, 4, 0)], 73).expect("assembles");
	let Artifact::Animation(animation) = artifact else {
		panic!("expected animation");
	};
	let durations: Vec<u32> = animation.frames.iter().map(|item| item.duration).collect();
	assert_eq!(durations, vec![73, 40, 73]);
	assert_eq!(animation.total_duration(), 186);
	assert_eq!((animation.width, animation.height), (4, 4));
}

#[test]
fn zero_default_is_not_replaced() {
	let artifact = assemble(vec![frame(2, 2, 0), frame(2, 2, 30)], 0).expect("assembles");
	let Artifact::Animation(animation) = artifact else {
		panic!("expected animation");
	};
	let durations: Vec<u32> = animation.frames.iter().map(|item| item.duration).collect();
	assert_eq!(durations, vec![0, 30]);
}

#[test]
fn library_default_is_one_hundred_ms() {
	let artifact = assemble(vec![frame(2, 2, 0), frame(2, 2, 0)], DEFAULT_FRAME_DURATION_MS).expect("assembles");
	assert!(matches!(artifact, Artifact::Animation(animation) if animation.total_duration() == 200));
}

#[test]
fn frame_helpers_cover_both_shapes() {
	let still = assemble(vec![frame(3, 5, 0)], 10).expect("static");
	assert_eq!(still.frame_count(), 1);
	assert_eq!(still.dimensions(), (3, 5));

	let moving = assemble(vec![frame(3, 5, 1), frame(3, 5, 2)], 10).expect("animation");
	assert_eq!(moving.frame_count(), 2);
	assert_eq!(moving.frame_images().len(), 2);
}

#[test]
fn empty_sequence_is_rejected() {
	assert!(matches!(assemble(Vec::new(), 100), Err(TpkError::MalformedRecord { .. })));
}

#[test]
fn mismatched_frame_sizes_are_rejected() {
	let frames = vec![frame(4, 4, 0), ReconstructedFrame {
		image: RgbaImage::new(5, 4),
		duration: 0,
	}];
	assert!(matches!(assemble(frames, 100), Err(TpkError::MalformedRecord { .. })));
}
