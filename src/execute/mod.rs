pub(crate) mod mode;
