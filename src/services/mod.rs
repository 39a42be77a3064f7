pub mod builds;
pub mod settings;

pub use builds::{BuildService, Favorite};
pub use settings::GuildSettingsService;
