pub mod bezier;
pub mod config;
pub mod mask;
pub mod navigate;
pub mod scroll_lock;
