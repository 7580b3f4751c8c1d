//! Content records for studiofolio.
//!
//! Each collection stored by the site has a record type here. Records are
//! plain serde structs with the camelCase field names the site has always
//! persisted, plus a [`Record`] impl describing how the collection assigns
//! ids, how records are ordered, and how older stored shapes are upgraded.

mod message;
mod project;
mod service;
mod settings;
mod testimonial;
pub mod versioning;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use message::Message;
pub use project::{Alignment, Project, ProjectSize};
pub use service::{CaseStudy, FaqEntry, Pricing, PricingTier, Service, ServiceIcon, TierName};
pub use settings::{Settings, SocialLink};
pub use testimonial::Testimonial;

/// Sort position used for records that carry no explicit `order`.
pub const DEFAULT_ORDER: i64 = 999;

/// How a collection assigns ids to new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Current time in milliseconds, bumped past any colliding id.
    Timestamp,
    /// One more than the largest id in the collection.
    Sequential,
}

/// A record stored in a content collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug {
    /// Human-readable collection name, used in logs and messages.
    const NAME: &'static str;

    /// Current schema version written alongside each record.
    const SCHEMA_VERSION: u32;

    /// How new ids are assigned.
    const ID_STRATEGY: IdStrategy;

    /// The record's id.
    fn id(&self) -> i64;

    /// Replace the record's id.
    fn set_id(&mut self, id: i64);

    /// Explicit display position, if any.
    fn order(&self) -> Option<i64> {
        None
    }

    /// Set the display position. Collections without ordering ignore this.
    fn set_order(&mut self, _order: Option<i64>) {}

    /// Apply defaults and coercions. Must be idempotent.
    #[must_use]
    fn normalize(self) -> Self;

    /// Upgrade a raw stored record from `from_version` to `from_version + 1`.
    ///
    /// Only called with versions below [`Record::SCHEMA_VERSION`].
    fn migrate(value: Value, from_version: u32) -> Value;

    /// Position used when sorting for display.
    ///
    /// Records without an order sort after every ordered record, and at
    /// [`DEFAULT_ORDER`] among themselves.
    fn sort_key(&self) -> (bool, i64) {
        (self.order().is_none(), self.order().unwrap_or(DEFAULT_ORDER))
    }
}
