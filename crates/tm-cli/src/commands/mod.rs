//! CLI command implementations

pub(crate) mod common;
pub(crate) mod current;
pub(crate) mod init;
pub(crate) mod migrate;
pub(crate) mod new;
pub(crate) mod setup;
pub(crate) mod status;
