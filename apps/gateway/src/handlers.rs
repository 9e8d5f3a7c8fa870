pub mod health;
pub mod navigation;
pub mod portal;
pub mod session;
