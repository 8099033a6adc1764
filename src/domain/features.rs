//! Well-known feature keys.
//!
//! A feature key doubles as a usage-event marker (recorded when the user
//! touches the feature) and as a visibility gate (queried before rendering).

pub const SINGLE_UPLOAD: &str = "single_upload";
pub const BATCH_UPLOAD: &str = "batch_upload";
pub const EXIF_VIEWER: &str = "exif_viewer";
pub const GPS_MAP: &str = "gps_map";
pub const METADATA_EXPORT: &str = "metadata_export";
pub const CSV_EXPORT: &str = "csv_export";
pub const PDF_REPORT: &str = "pdf_report";
pub const COMPARISON_VIEW: &str = "comparison_view";
pub const ADVANCED_FILTERS: &str = "advanced_filters";
pub const HASH_VERIFICATION: &str = "hash_verification";
pub const FORENSIC_TIMELINE: &str = "forensic_timeline";
pub const BULK_PROCESSING: &str = "bulk_processing";
pub const CUSTOM_REPORTS: &str = "custom_reports";
pub const API_ACCESS: &str = "api_access";
pub const TEAM_WORKSPACE: &str = "team_workspace";
pub const AUDIT_LOG: &str = "audit_log";
pub const KEYBOARD_SHORTCUTS: &str = "keyboard_shortcuts";

// Usage markers that are never gated
pub const TOOLTIP_VIEWED: &str = "tooltip_viewed";
pub const DISCLOSURE_EXPANDED: &str = "disclosure_expanded";

// Guides unlocked by achievements
pub const METADATA_EXPLORATION_GUIDE: &str = "metadata_exploration_guide";
pub const EXPORT_OPTIONS_TUTORIAL: &str = "export_options_tutorial";
