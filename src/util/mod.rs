pub(crate) mod cmd;
pub(crate) mod input;
pub(crate) mod path;
