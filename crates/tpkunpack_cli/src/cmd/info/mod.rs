use std::path::PathBuf;

use serde::Serialize;
use tpkunpack::tpk::{RecordSummary, Result, TpkFile};

use crate::cmd::util::{emit_json, or_dash};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the container header and one line per record.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = TpkFile::open(&path)?;
	let records: Vec<RecordJson> = file.inspect().into_iter().map(RecordJson::from).collect();

	if json {
		emit_json(&InfoJson {
			path: path.display().to_string(),
			version: file.header.version,
			flags: file.header.flags,
			header_size: file.header.header_size(),
			file_size: file.bytes().len(),
			record_count: records.len(),
			records,
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("version: {}", file.header.version);
	println!("flags: 0x{:04x}", file.header.flags);
	println!("header_size: {}", file.header.header_size());
	println!("file_size: {}", file.bytes().len());
	println!("record_count: {}", records.len());
	println!("records:");
	for record in &records {
		match &record.error {
			Some(error) => println!("  [{}] @{}+{} error: {error}", record.index, record.offset, record.size),
			None => println!(
				"  [{}] @{}+{} {} canvas={}x{} frames={} blob={} scale={}",
				record.index,
				record.offset,
				record.size,
				or_dash(record.name.as_deref()),
				or_dash(record.canvas_width),
				or_dash(record.canvas_height),
				or_dash(record.frame_count),
				or_dash(record.blob_size),
				or_dash(record.scale),
			),
		}
	}

	Ok(())
}

#[derive(Serialize)]
struct RecordJson {
	index: usize,
	offset: usize,
	size: usize,
	name: Option<String>,
	canvas_width: Option<u32>,
	canvas_height: Option<u32>,
	frame_count: Option<usize>,
	blob_size: Option<usize>,
	scale: Option<f32>,
	error: Option<String>,
}

impl From<RecordSummary> for RecordJson {
	fn from(summary: RecordSummary) -> Self {
		let RecordSummary { index, range, record } = summary;
		let mut row = Self {
			index,
			offset: range.offset,
			size: range.size,
			name: None,
			canvas_width: None,
			canvas_height: None,
			frame_count: None,
			blob_size: None,
			scale: None,
			error: None,
		};

		match record {
			Ok(record) => {
				row.name = Some(record.display_name(index));
				row.canvas_width = Some(record.canvas.width);
				row.canvas_height = Some(record.canvas.height);
				row.frame_count = Some(record.frames.len());
				row.blob_size = Some(record.blob.len());
				row.scale = Some(record.scale);
			}
			Err(err) => row.error = Some(err.to_string()),
		}
		row
	}
}

#[derive(Serialize)]
struct InfoJson {
	path: String,
	version: u16,
	flags: u16,
	header_size: usize,
	file_size: usize,
	record_count: usize,
	records: Vec<RecordJson>,
}
