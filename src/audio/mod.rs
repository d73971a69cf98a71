// Audio playback module
// Uses Symphonia for decoding and cpal for output

pub mod asset;
pub mod convert;
pub mod decoder;
pub mod error;
pub mod output;
pub mod player;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use asset::AlertAsset;
pub use error::PlayerError;
pub use output::AudioOutput;
pub use player::AlertPlayer;
pub use session::SessionId;
