//! Domain types shared by the service and infrastructure layers

pub mod sandbox;
pub mod types;
