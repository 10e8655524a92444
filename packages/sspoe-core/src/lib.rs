//! # sspoe-core - bilingual physics activity player
//!
//! Pure Rust core of the SSPOE learning app: a curriculum catalog of
//! levels, courses and activities, a navigation router, and the
//! Prediction → Observation → Explanation step player, rendered in French
//! or Arabic.
//!
//! ## Design
//!
//! - **Host independent** - no DOM, storage or network; the environment is
//!   reached through the [`Host`], [`PreferenceStore`], [`CacheStorage`] and
//!   [`Network`] traits
//! - **Owned session** - one [`Session`] value per learner, mutated only by
//!   the [`Controller`]
//! - **Derived views** - [`render`] rebuilds the whole [`ViewDescriptor`]
//!   from the session and the catalog
//!
//! ## Modules
//!
//! - [`types`] - languages, steps and shared constants
//! - [`i18n`] - localized text and fallback rules
//! - [`catalog`] - curriculum data, lookup and validation
//! - [`step`] - step engine, answer capture and evaluation
//! - [`session`] - navigation state machine
//! - [`view`] - view descriptor rendering
//! - [`controller`] - callbacks, host effects and action dispatch
//! - [`preferences`] - language persistence
//! - [`install`] - install banner flow
//! - [`offline`] - versioned cache-first offline policy
//!
//! ## Example
//!
//! ```rust
//! use sspoe_core::{Catalog, Session, Verdict, evaluate_correctness};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let mut session = Session::default();
//! session.select_level(&catalog, "1ac");
//! session.select_activity(&catalog, "1ac_pression", "1ac_pression_act1");
//! session.select_answer(&catalog, &"b".into());
//! session.validate();
//!
//! let (_, _, activity) = session.active(&catalog).unwrap();
//! let verdict = evaluate_correctness(session.captured_answer(), &activity.prediction);
//! assert_eq!(verdict, Verdict::Correct);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod types;
pub mod i18n;
pub mod catalog;
pub mod step;
pub mod session;
pub mod view;
pub mod preferences;
pub mod install;
pub mod controller;
pub mod offline;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use i18n::{resolve, LocalizedText};

pub use catalog::{
    Activity, Catalog, CatalogError, Choice, Course, Level, PredictionKind, PredictionSpec,
};

pub use step::{evaluate_correctness, recap, AnswerInput, CapturedAnswer, Stage, StepState, Verdict};

pub use session::{Navigation, PlayerState, Session};

pub use view::{render, Screen, StepContent, ViewDescriptor};

pub use preferences::{MemoryPreferences, PreferenceError, PreferenceStore};

pub use install::{InstallFlow, InstallOutcome};

pub use controller::{Action, Controller, Host, HostError};

pub use offline::{
    CacheManifest, CacheStorage, MemoryCacheStorage, Network, OfflineCache, OfflineError,
    CACHE_VERSION, PRECACHE_ASSETS,
};
