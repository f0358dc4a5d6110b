// Config module - Settings and their persistence
//
// This module provides:
// - The `Settings` record and its defaults
// - A sectioned key/value configuration file reader/writer
// - Configuration directory resolution
// - `ConfigStore`, which loads, validates and saves settings

pub mod error;
pub mod file;
pub mod paths;
pub mod settings;
pub mod store;

pub use error::ConfigError;
pub use file::ConfFile;
pub use paths::{config_dir_from_env, resolve_config_dir, CONFIG_FILE_NAME};
pub use settings::{
    AspectRatio, BehaviorSettings, ClockCycles, DisplaySettings, EmulationSettings, EscBehavior,
    FileSettings, GpuSettings, HackSettings, HiresEffect, InputSettings, Interpolation,
    NetplaySettings, NtscSettings, Settings, SoundSettings, ThrottleMode, WindowState,
    SCALE_FILTER_COUNT, SPRITE_TILES_LIMITED, SPRITE_TILES_UNLIMITED,
};
pub use store::ConfigStore;
