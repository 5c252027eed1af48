use crate::tpk::{Animation, Result};

/// Encoder turning an assembled animation into a file payload.
pub trait AnimationEncoder: Sync {
	/// Encode frames and durations; failures are [`TpkError::EncodeFailure`](crate::tpk::TpkError::EncodeFailure).
	fn encode_animation(&self, animation: &Animation) -> Result<Vec<u8>>;

	/// File extension of the encoded payload, without the dot.
	fn extension(&self) -> &'static str;
}
