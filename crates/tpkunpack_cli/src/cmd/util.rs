use serde::Serialize;

/// Print a value as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: cannot render json: {err}"),
	}
}

/// Render optional value or a dash.
pub(crate) fn or_dash<T: ToString>(value: Option<T>) -> String {
	value.map(|item| item.to_string()).unwrap_or_else(|| "-".to_owned())
}
