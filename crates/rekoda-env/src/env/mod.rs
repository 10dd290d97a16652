//! Runtime environment builder: the `venv` the recorder's Python tooling lives in.
//!
//! Creation is gated by a directory check; installation runs inside an explicit
//! [`builder::ActivatedEnv`] instead of a shell-level activate/deactivate toggle.

pub mod builder;
