//! Domain layer containing the personalization decision logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, analytics records)
//! - `features` - Well-known feature keys
//! - `context` - The user context, usage counters and experience classifier
//! - `rules` - The generic condition interpreter and named predicates
//! - `visibility` - Per-feature visibility resolution
//! - `hints` - Contextual hint catalog and trigger evaluation
//! - `achievements` - Achievement catalog and completion check
//! - `navigation` - User tiers and navigation composition

pub mod achievements;
pub mod context;
pub mod features;
pub mod foundation;
pub mod hints;
pub mod navigation;
pub mod rules;
pub mod visibility;
