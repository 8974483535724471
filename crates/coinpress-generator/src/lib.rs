//! Coinpress Generator Library
//!
//! Regenerates the crypto-news portal from the dated pages under `content/`.
//!
//! # Modules
//!
//! - [`collector`] - Entry discovery from the content tree
//! - [`summary`] - Summary extraction from `<YYYY-MM-DD>.md` files
//! - [`template`] - HTML template system with variable interpolation
//! - [`portal`] - Portal landing page generation
//! - [`nav`] - Per-entry navigation sidebar rendering
//! - [`routing`] - Routing config (`vercel.json`) generation
//! - [`assets`] - Image asset verification
//! - [`build`] - Regeneration orchestration

pub mod assets;
pub mod build;
pub mod collector;
pub mod nav;
pub mod portal;
pub mod routing;
pub mod summary;
pub mod template;

pub use assets::{AssetVerifier, VerifyReport};
pub use build::{BuildStats, Regenerator};
pub use collector::{EntryCollector, ScanReport};
pub use nav::NavRenderer;
pub use portal::PortalGenerator;
pub use routing::RoutingGenerator;
pub use summary::SummaryExtractor;
pub use template::{Template, TemplateContext, TemplateRegistry};
