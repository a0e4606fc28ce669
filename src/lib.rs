//! TerraEMS quotation library
//!
//! This module exposes the pricing core, persistence and export
//! for the CLI binaries and for tests.

pub mod admin;
pub mod catalog;
pub mod core;
pub mod db;
pub mod export;
pub mod pricing;
pub mod quote;
