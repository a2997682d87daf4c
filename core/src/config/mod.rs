mod load;
mod types;

pub use load::{from_toml_str, load, DEFAULT_CONFIG_FILE};
pub use types::*;
