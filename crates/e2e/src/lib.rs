//! Test-data lifecycle for the practice notes e2e suite
//!
//! This crate sits between scenario code and the `practice-api` clients:
//! - Generates unique users and notes
//! - Loads JSON fixtures and substitutes their placeholder tokens
//! - Records every remote entity it creates
//! - Deletes them again, notes before accounts, and reports what happened
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TestSuite                                                  │
//! │    ├── before_suite(SuiteConfig) -> probe + shared handle   │
//! │    ├── after_scenario() -> CleanupReport                    │
//! │    └── dispose() -> CleanupReport                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestDataApi (Arc<tokio::sync::Mutex<_>>)                   │
//! │    ├── create_user_and_get_token / create_multiple_users    │
//! │    ├── create_note / create_multiple_notes                  │
//! │    ├── create_notes_with_mixed_status                       │
//! │    ├── cleanup() / reset()                                  │
//! │    └── Ledger { users, notes }                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestDataProvider                                           │
//! │    ├── generate_user / generate_note                        │
//! │    └── FixtureStore + PlaceholderReplacer                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  practice_api::{AuthApi, NotesApi} -> ApiClient -> HTTP     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cleanup;
pub mod error;
pub mod fixtures;
pub mod ledger;
pub mod orchestrator;
pub mod placeholder;
pub mod provider;
pub mod suite;

pub use cleanup::{CleanupEntry, CleanupOutcome, CleanupReport, TrackedEntity};
pub use error::{E2eError, E2eResult};
pub use fixtures::FixtureStore;
pub use ledger::{CreatedNote, CreatedUser, Ledger};
pub use orchestrator::{MixedStatusNotes, TestDataApi};
pub use placeholder::{PlaceholderConfig, PlaceholderReplacer};
pub use provider::{NoteOverrides, TestDataProvider, UniquenessStrategy};
pub use suite::{SharedTestData, SuiteConfig, TestSuite};
