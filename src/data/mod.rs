//! Window buffering and trigger persistence.
pub mod registry;
pub mod storage;
pub mod window;
