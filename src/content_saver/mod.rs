//! Persistence of the run summary

mod json_saver;

pub use json_saver::{load_metadata, save_metadata};
