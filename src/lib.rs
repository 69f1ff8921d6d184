pub mod aggregator;
pub mod app;
pub mod audio;
pub mod batch;
pub mod config;
pub mod editor;
pub mod error;
pub mod genre;
pub mod library;
pub mod model;
pub mod picker;
pub mod similarity;
pub mod sources;
pub mod ui;
