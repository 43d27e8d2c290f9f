//! Sectioned RON settings with delta persistence.
//!
//! Every settings type owns one named section. Defaults come from
//! `Default`; the file on disk only stores what differs from them.

mod error;
mod store;

pub use error::SettingsError;
pub use store::{SettingsStore, SettingsStoreBuilder};

/// A type stored as one section of the settings file.
pub trait Settings: 'static + Send + Sync {
    /// Top-level key of the section.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}
