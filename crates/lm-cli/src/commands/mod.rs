//! CLI command implementations

pub(crate) mod common;
pub(crate) mod migrate;
pub(crate) mod new;
pub(crate) mod status;
pub(crate) mod verify;
