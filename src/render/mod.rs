pub(crate) mod target;
pub(crate) mod texture;
