/// Codec adapters for embedded atlas images.
pub mod codec;
/// GIF animation encoder.
pub mod encode;
/// On-disk export of extracted sprites.
pub mod export;
/// Container header and record listing command.
pub mod info;
/// Sprite extraction command.
pub mod unpack;

#[cfg(test)]
mod test_support;
mod util;
