pub(crate) mod lvars;
pub(crate) mod profile;
pub(crate) mod response_common;
pub(crate) mod status;
