//! tm-core - Core library for Tidemark
//!
//! This crate provides the shared types used across all Tidemark components:
//! project configuration, the unit naming scheme, unit directory scanning,
//! and the on-disk unit descriptor format.

pub mod checksum;
pub mod config;
pub mod error;
mod newtype_string;
pub(crate) mod serde_helpers;
pub mod unit;
pub mod unit_dir;
pub mod unit_id;
pub mod version_label;

pub use checksum::compute_checksum;
pub use config::{
    is_plain_identifier, ComponentConfig, Config, DatabaseConfig, DbType, Dialect, TargetConfig,
};
pub use error::{CoreError, CoreResult};
pub use unit::{UnitDescriptor, UnitKind};
pub use unit_dir::{UnitDirectory, UnitFile};
pub use unit_id::{UnitId, DEFAULT_NUMBER_WIDTH, UNIT_EXTENSION};
pub use version_label::VersionLabel;
