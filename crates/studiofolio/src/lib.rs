//! `studiofolio` - The content layer of a studio portfolio site
//!
//! This library stores the site's projects, services, testimonials, contact
//! messages and settings as JSON documents in a local content store, and
//! provides the validated editors and read-side views built on top of it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod collection;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use repo::{ContentStats, Repository};
pub use store::{ContentStore, Revision};
