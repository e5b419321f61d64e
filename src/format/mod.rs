pub(crate) mod caps;
pub(crate) mod negotiate;
pub(crate) mod request;
