pub mod log;
pub(crate) mod sync;
