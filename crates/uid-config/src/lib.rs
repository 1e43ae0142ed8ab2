//! Server settings, project discovery and gem configuration (.kiro/gem-config.json).

pub mod gem;
pub mod project;
pub mod settings;

pub use gem::{GemConfig, GemStore};
pub use project::{
    DetectedFiles, auto_detect_files, project_name, read_file_sections, read_steering,
};
pub use settings::{ModelSettings, ResilienceSettings, Settings};
