pub mod redis;
pub mod sessions;
pub mod state_builder;
