pub mod state;

pub use state::{AssistantSettings, SettingsError, SettingsStore};
