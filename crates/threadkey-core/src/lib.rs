//! Core threadkey library (key codec, keying engine, renderer, config).
//!
//! Keys encode each record's path from its root as zero-padded base-36
//! sibling indices, so one flat string sort yields a depth-first listing.
//!
//! - `key`: key string helpers and the comparator
//! - `engine`: incremental key assignment and the final sort
//! - `render`: indented text view derived from keys
//! - `config`: `config.toml` loading and templates
//! - `error`: faults that abort a keying pass

pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod render;

pub use engine::{assign_keys, sort_thread};
pub use error::ThreadError;
pub use render::{format_thread, format_thread_with};
pub use threadkey_types::{Item, OptionsError, SortOptions, ThreadItem};
