//! Configuration, document intake and session state for lexcheck.
//!
//! # Architecture
//!
//! - [`config`] - `~/.lexcheck/config.toml` loading and layering with env/flags into [`Settings`]
//! - [`intake`] - file type checks and text loading, run before any request
//! - [`session`] - the single-request state machine the UI renders
//! - [`persist`] - saving the raw response JSON

pub mod config;
pub mod intake;
pub mod persist;
pub mod session;

pub use config::{ConfigError, LexcheckConfig, Overrides, Settings};
pub use intake::{Document, IntakeError, TextSource, load_document, validate_extension};
pub use persist::{PersistError, save_results};
pub use session::{Banner, BannerKind, Phase, Session, SessionError};

pub use lexcheck_client;
pub use lexcheck_types;
