//! Infrastructure layer

pub mod process;
