//! Creates users and notes through the domain clients and removes them again

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use practice_api::{ApiClient, ApiError, ApiResponse, AuthApi, Note, NoteCreate, NotesApi, UserCreate};

use crate::cleanup::{CleanupOutcome, CleanupReport, TrackedEntity};
use crate::error::{E2eError, E2eResult};
use crate::ledger::{CreatedUser, Ledger};
use crate::provider::{
    InvalidFixtureData, NoteOverrides, ProgrammaticInvalidData, TestDataProvider, ValidFixtureData,
};

/// Notes returned by [`TestDataApi::create_notes_with_mixed_status`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MixedStatusNotes {
    pub completed: Vec<Note>,
    pub pending: Vec<Note>,
}

/// Test-data orchestrator.
///
/// Every user and note created through it is recorded in its [`Ledger`]
/// before the creating call returns, and [`TestDataApi::cleanup`] deletes
/// them all again: notes first, then accounts.
#[derive(Debug)]
pub struct TestDataApi {
    auth: AuthApi,
    notes: NotesApi,
    provider: TestDataProvider,
    ledger: Ledger,
}

impl TestDataApi {
    pub fn new(client: ApiClient, provider: TestDataProvider) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            notes: NotesApi::new(client),
            provider,
            ledger: Ledger::new(),
        }
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn notes(&self) -> &NotesApi {
        &self.notes
    }

    pub fn provider(&self) -> &TestDataProvider {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut TestDataProvider {
        &mut self.provider
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn get_created_user(&self, index: usize) -> Option<&CreatedUser> {
        self.ledger.user(index)
    }

    // Data provider delegation

    pub fn generate_user(&self, suffix: &str) -> UserCreate {
        self.provider.generate_user(suffix)
    }

    pub fn generate_note(&self, overrides: NoteOverrides) -> NoteCreate {
        self.provider.generate_note(overrides)
    }

    pub fn data(&self) -> ProgrammaticInvalidData {
        self.provider.get_programmatic_invalid_data()
    }

    pub fn get_invalid_data(&self) -> E2eResult<InvalidFixtureData> {
        self.provider.get_invalid_data_from_fixtures()
    }

    pub fn get_valid_data(&self) -> E2eResult<ValidFixtureData> {
        self.provider.get_valid_data_from_fixtures()
    }

    pub fn get_note_from_fixture(&self, note_type: &str) -> E2eResult<NoteCreate> {
        self.provider.get_note_from_fixture(note_type)
    }

    pub fn get_all_notes_from_fixtures(&self) -> E2eResult<BTreeMap<String, NoteCreate>> {
        self.provider.get_all_notes_from_fixtures()
    }

    // Creation

    /// Register and log in a user (generated when `user_data` is `None`)
    /// and return its session token
    pub async fn create_user_and_get_token(&mut self, user_data: Option<UserCreate>) -> E2eResult<String> {
        let user = user_data.unwrap_or_else(|| self.generate_user(""));
        let token = self.auth.register_and_login(&user).await?;

        debug!("Created user {}", user.email);
        self.ledger.track_user(token.clone(), user);
        Ok(token)
    }

    /// Create `count` users concurrently, suffixed `_0`, `_1`, ...
    ///
    /// Every user that got a token is tracked. If any registration failed the
    /// first error is returned after tracking the rest.
    pub async fn create_multiple_users(&mut self, count: usize) -> E2eResult<Vec<String>> {
        let users: Vec<UserCreate> = (0..count)
            .map(|i| self.generate_user(&format!("_{}", i)))
            .collect();

        let auth = &self.auth;
        let results = join_all(users.iter().map(|user| auth.register_and_login(user))).await;

        let mut tokens = Vec::with_capacity(count);
        let mut first_error: Option<ApiError> = None;
        for (user, result) in users.into_iter().zip(results) {
            match result {
                Ok(token) => {
                    self.ledger.track_user(token.clone(), user);
                    tokens.push(token);
                }
                Err(e) => {
                    warn!("Failed to create user {}: {}", user.email, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(tokens),
        }
    }

    /// Create one note for `token`. Only a successful creation is tracked.
    pub async fn create_note(&mut self, token: &str, note_data: Option<NoteCreate>) -> E2eResult<Note> {
        let note = note_data.unwrap_or_else(|| self.generate_note(NoteOverrides::new()));
        let response = self.notes.create(token, &note).await?;
        self.track_created(token, &response)
    }

    /// Create `count` generated notes concurrently. Partial success is
    /// returned; zero successes is an error.
    pub async fn create_multiple_notes(&mut self, token: &str, count: usize) -> E2eResult<Vec<Note>> {
        let notes: Vec<NoteCreate> = (0..count)
            .map(|_| self.generate_note(NoteOverrides::new()))
            .collect();
        let results = self.notes.create_multiple(token, &notes).await;

        let mut created = Vec::new();
        for result in results {
            match result {
                Ok(response) if response.is_success() => match self.track_created(token, &response) {
                    Ok(note) => created.push(note),
                    Err(e) => warn!("Created note could not be read back: {}", e),
                },
                Ok(response) => warn!(
                    "Note creation failed with status {}: {}",
                    response.status,
                    response.message().unwrap_or("no message")
                ),
                Err(e) => warn!("Note creation failed: {}", e),
            }
        }

        if created.is_empty() {
            return Err(E2eError::BatchCreationFailed { requested: count });
        }
        info!("Created {}/{} notes", created.len(), count);
        Ok(created)
    }

    /// Create two completed and two pending notes, partitioned by status
    pub async fn create_notes_with_mixed_status(&mut self, token: &str) -> E2eResult<MixedStatusNotes> {
        let notes = [
            ("Completed Note 1", true),
            ("Completed Note 2", true),
            ("Pending Note 1", false),
            ("Pending Note 2", false),
        ]
        .map(|(title, completed)| {
            self.generate_note(NoteOverrides::new().title(title).completed(completed))
        });

        let results = self.notes.create_multiple(token, &notes).await;

        let mut mixed = MixedStatusNotes::default();
        let mut first_error: Option<E2eError> = None;
        for result in results {
            let note = result
                .map_err(E2eError::from)
                .and_then(|response| self.track_created(token, &response));
            match note {
                Ok(note) if note.completed => mixed.completed.push(note),
                Ok(note) => mixed.pending.push(note),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(mixed),
        }
    }

    fn track_created(&mut self, token: &str, response: &ApiResponse) -> E2eResult<Note> {
        if !response.is_success() {
            warn!("Note creation failed with status {}", response.status);
            return Err(E2eError::NoteCreationFailed {
                status: response.status,
                message: response.message().map(str::to_string),
            });
        }

        let id = response
            .body_path("data.id")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::assertion("body.data", "to have property 'id'"))?;
        self.ledger.track_note(id, token);

        Ok(response.data_as::<Note>()?)
    }

    // Teardown

    /// Delete every tracked note, then every tracked account.
    ///
    /// Each deletion is attempted regardless of earlier failures and the
    /// ledger is empty afterwards whatever the outcomes.
    pub async fn cleanup(&mut self) -> CleanupReport {
        let (users, notes) = self.ledger.take();
        let mut report = CleanupReport::default();

        let note_results = join_all(notes.iter().map(|n| self.notes.delete(&n.token, &n.id))).await;
        for (note, result) in notes.into_iter().zip(note_results) {
            report.push(TrackedEntity::Note { id: note.id }, CleanupOutcome::from_result(result));
        }

        let user_results = join_all(users.iter().map(|u| self.auth.delete_account(&u.token))).await;
        for (user, result) in users.into_iter().zip(user_results) {
            let entity = TrackedEntity::User {
                email: user.user_data.email,
            };
            report.push(entity, CleanupOutcome::from_result(result));
        }

        if report.is_clean() {
            info!("Test data cleanup completed ({} deleted)", report.deleted());
        } else {
            for failure in report.failures() {
                warn!("Cleanup left {:?} behind: {:?}", failure.entity, failure.outcome);
            }
            info!(
                "Test data cleanup completed with {} of {} deletions failing",
                report.len() - report.deleted(),
                report.len()
            );
        }
        report
    }

    /// Forget every tracked entity without deleting anything
    pub fn reset(&mut self) {
        self.ledger.clear();
    }
}
