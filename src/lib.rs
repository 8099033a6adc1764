//! Metascope - Adaptive Personalization Engine
//!
//! This crate decides how the Metascope interface adapts to each user:
//! which features are visible, which contextual hints appear, which
//! achievements unlock new feature sets, and how navigation is laid out.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
