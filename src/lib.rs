pub mod app;
pub mod aqi;
pub mod color;
pub mod config;
pub mod data;
pub mod geo;
pub mod locate;
pub mod state;
pub mod ui;
