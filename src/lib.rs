pub mod analysis;
pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod importers;
pub mod ingest;
pub mod observation;
pub mod services;
pub mod utils;
pub mod window;
