//! Rekoda configuration layer.
//!
//! Every environment variable read lives here; the rest of the workspace goes
//! through the structured configs instead of calling `std::env::var` directly.
//!
//! - `loader`: env_or, env_optional, env_bool and `.env` loading
//! - `schema`: ObservabilityConfig, PathsConfig
//! - `env_keys`: key constants (with `CHZZK_*` legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{ObservabilityConfig, PathsConfig};
