pub mod clip;
pub mod compositor;
pub mod library;
