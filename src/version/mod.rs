//! Version ordering, selection and change detection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sources   │────▶│  Selector   │────▶│  Detector   │
//! │ (outcomes)  │     │ (rank, max) │     │ (compare)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ VersionKey  │     │ StateStore  │
//!                     │ (ordering)  │     │  (storage)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`key`]: Integer-tuple keys and canonical rendering
//! - [`selector`]: Per-source outcomes and latest-version selection
//! - [`detector`]: Change detection against a stored value
//! - [`error`]: Error types shared by every layer

pub mod detector;
pub mod error;
pub mod key;
pub mod selector;

pub use detector::{ChangeSignal, StateStore, detect_change};
pub use key::{RenderStyle, VersionKey};
pub use selector::{Selection, SourceOutcome, SourceReport, select, select_from_reports};
