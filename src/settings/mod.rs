// Application settings
#[allow(clippy::module_inception)]
mod settings;

pub use settings::AppSettings;
