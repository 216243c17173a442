pub mod app;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod core;
pub mod model;
pub mod shuffle;
pub mod ui;
