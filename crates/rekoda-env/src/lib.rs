pub mod delegate;
pub mod env;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod runtime_resolver;

pub use error::BootstrapError;
pub use pipeline::{run_setup, BootstrapPlan, BootstrapReport};
