//! API layer

pub mod mcp;
