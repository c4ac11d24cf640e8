//! Capacity model tooling for a Google Sheets workbook.
//!
//! Reads the capacity projection and matrix criteria tabs, classifies project
//! descriptions into roles, summarizes rep capacity and exports CSV.

pub mod capacity;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod google_api;
pub mod matrix;
pub mod report;
pub mod sheets;
pub mod util;
pub mod webhook;
