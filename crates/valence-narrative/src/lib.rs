// ─────────────────────────────────────────────────────────────────────
// Valence-Pi — Narrative Layer
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Consumers of engine output: state-guide lookup, threshold-branched
//! narrative templates, and the top-impact inspector/report.
//!
//! Nothing in this crate can fail a simulation run. A missing guide
//! degrades to placeholder text; a missing guide file degrades to an
//! empty store.

pub mod guide;
pub mod inspector;
pub mod narrative;

pub use guide::{GuideBook, InMemoryGuides, StateGuide, StateGuideStore};
pub use inspector::{inspect, AlignmentReport, ImpactInsight};
pub use narrative::{NarrativeBranch, NarrativeEngine};
