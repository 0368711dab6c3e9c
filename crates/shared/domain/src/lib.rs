//! # Domain Models
//!
//! This crate contains the typed settings model with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, networking, or source resolution, just data, defaults and derived views.

pub mod features;
pub mod settings;

pub use features::FeatureSet;
pub use settings::{JwtSettings, MongoSettings, Settings, SettingsIssue};
