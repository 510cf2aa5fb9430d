pub mod app;
pub mod view;

pub use app::{run, ViewerOptions};
