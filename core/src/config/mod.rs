mod load;
mod types;

pub use load::{
    apply_env_overrides, load_default, load_from_path, ConfigSource, CONFIG_DIR,
    CONFIG_FILE,
};
pub use types::{AppConfig, LoggingConfig};
