//! Terminal dashboard for a web application security audit backend.
//!
//! [`api`] talks to the backend, [`views`] hold per-page state and derived
//! data, and [`repl`] / [`cli`] put it on the terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod repl;
pub mod utils;
pub mod views;
