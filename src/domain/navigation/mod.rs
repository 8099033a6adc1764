//! Navigation domain module.
//!
//! - `user_tier` - `UserTier` and how a context resolves to one
//! - `item` - `NavItem` definitions
//! - `catalog` - Items and per-tier layouts
//! - `composer` - Pure composition of primary/secondary/prominent lists

mod catalog;
mod composer;
mod item;
mod user_tier;

pub use catalog::{NavCatalog, TierNavConfig};
pub use composer::{compose, ComposedNavigation};
pub use item::{BadgeTone, NavBadge, NavItem};
pub use user_tier::{is_business_email, resolve_user_tier, UserTier};
