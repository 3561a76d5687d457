//! Core library components.
//!
//! This module contains the reusable logic for secret file encryption,
//! stack descriptors, and placeholder resolution. Nothing here prints or
//! exits; terminal interaction goes through [`console::Console`].

pub mod cipher;
pub mod config;
pub mod console;
pub mod constants;
pub mod git;
pub mod placeholders;
pub mod secrets;
pub mod stack;
