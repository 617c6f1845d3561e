//! Identity document capture wizard.
//!
//! A terminal wizard that walks a user through picking the issuing country
//! and document, photographs each side with a camera, and has every photo
//! quality-checked by a remote verification service before moving on.

pub mod api;
pub mod app;
pub mod camera;
pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod countries;
pub mod defaults;
pub mod logging;
pub mod screens;
pub mod types;
pub mod ui;
pub mod wizard;
