mod app;
mod cli;
mod effects;
mod logging;
mod render;
mod shell;

pub use app::run_app;
