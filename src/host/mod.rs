pub(crate) mod config;
pub(crate) mod node;
pub(crate) mod status;
