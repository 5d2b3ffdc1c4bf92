// Configuration loading

pub mod settings;

pub use settings::{ConfigError, Settings, CONFIG_ENV, DEFAULT_INDENT, MAX_INDENT};
