pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod controller;
pub mod correlation;
pub mod database;
pub mod error;
pub mod form;
pub mod persistence;
pub mod store;
pub mod utils;
pub mod workout;
