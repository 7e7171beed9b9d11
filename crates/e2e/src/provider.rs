//! Synthetic and fixture-sourced test data

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use practice_api::{Category, NoteCreate, UserCreate};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{FixtureStore, INVALID_API_DATA, INVALID_NOTE_DATA, INVALID_USER_DATA, NOTE_DATA};
use crate::placeholder::PlaceholderReplacer;

/// Password given to every generated user
pub const DEFAULT_PASSWORD: &str = "SecurePass123!";

/// How generated users are kept apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessStrategy {
    /// `<epoch millis><suffix>`. Two calls in the same millisecond with the
    /// same suffix collide.
    Timestamp,
    /// Adds 8 hex chars of a v4 uuid after the millis in the email
    #[default]
    TimestampUuid,
}

/// Per-field overrides for [`TestDataProvider::generate_note`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub completed: Option<bool>,
}

impl NoteOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Invalid payloads built in memory rather than read from fixtures
#[derive(Debug, Clone)]
pub struct ProgrammaticInvalidData {
    pub user: InvalidUsers,
    pub note: InvalidNotes,
}

#[derive(Debug, Clone)]
pub struct InvalidUsers {
    /// An address with the `@` removed
    pub invalid_email: String,
    pub empty_name: UserCreate,
    pub short_password: UserCreate,
}

#[derive(Debug, Clone)]
pub struct InvalidNotes {
    pub empty_title: NoteCreate,
    /// `title: null`, which the typed payload cannot express
    pub null_title: Value,
    pub long_title: NoteCreate,
    /// Every field carrying the wrong JSON type
    pub wrong_types: Value,
}

/// Invalid-scenario fixtures with placeholders substituted
#[derive(Debug, Clone)]
pub struct InvalidFixtureData {
    pub user: Value,
    pub note: Value,
    pub api: Value,
}

/// Valid-scenario fixtures with placeholders substituted
#[derive(Debug, Clone)]
pub struct ValidFixtureData {
    pub note: Value,
}

/// Generates users and notes and loads fixtures
#[derive(Debug, Clone)]
pub struct TestDataProvider {
    replacer: PlaceholderReplacer,
    fixtures: FixtureStore,
    uniqueness: UniquenessStrategy,
}

impl TestDataProvider {
    pub fn new(replacer: PlaceholderReplacer, fixtures: FixtureStore) -> Self {
        Self {
            replacer,
            fixtures,
            uniqueness: UniquenessStrategy::default(),
        }
    }

    pub fn with_uniqueness(mut self, uniqueness: UniquenessStrategy) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn replacer_mut(&mut self) -> &mut PlaceholderReplacer {
        &mut self.replacer
    }

    /// A fresh user: `TestUser<millis><suffix>` with a matching
    /// `testuser...@example.com` address.
    ///
    /// The uuid fragment only goes into the address; the service caps names
    /// at 30 characters.
    pub fn generate_user(&self, suffix: &str) -> UserCreate {
        let millis = Utc::now().timestamp_millis();
        let fragment = match self.uniqueness {
            UniquenessStrategy::Timestamp => String::new(),
            UniquenessStrategy::TimestampUuid => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                id[..8].to_string()
            }
        };
        UserCreate {
            name: format!("TestUser{}{}", millis, suffix),
            email: format!("testuser{}{}{}@example.com", millis, fragment, suffix),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }

    /// A timestamped note, with `overrides` winning per field
    pub fn generate_note(&self, overrides: NoteOverrides) -> NoteCreate {
        let now = Utc::now();
        NoteCreate {
            title: overrides
                .title
                .unwrap_or_else(|| format!("Test Note {}", now.timestamp_millis())),
            description: overrides.description.unwrap_or_else(|| {
                format!(
                    "This is a test note created at {}",
                    now.to_rfc3339_opts(SecondsFormat::Millis, true)
                )
            }),
            category: overrides.category.unwrap_or(Category::Personal),
            completed: overrides.completed.unwrap_or(false),
        }
    }

    pub fn get_programmatic_invalid_data(&self) -> ProgrammaticInvalidData {
        let empty_name = UserCreate {
            name: String::new(),
            ..self.generate_user("")
        };
        let short_password = UserCreate {
            password: "123".to_string(),
            ..self.generate_user("")
        };

        let mut null_title = serde_json::to_value(self.generate_note(NoteOverrides::new()))
            .unwrap_or_else(|_| json!({}));
        null_title["title"] = Value::Null;

        ProgrammaticInvalidData {
            user: InvalidUsers {
                invalid_email: self.generate_user("").email.replace('@', ""),
                empty_name,
                short_password,
            },
            note: InvalidNotes {
                empty_title: self.generate_note(NoteOverrides::new().title("")),
                null_title,
                long_title: self.generate_note(NoteOverrides::new().title("A".repeat(1000))),
                wrong_types: json!({"title": 123, "description": true, "completed": "yes"}),
            },
        }
    }

    pub fn get_invalid_data_from_fixtures(&self) -> E2eResult<InvalidFixtureData> {
        let mut user = self.fixtures.load(INVALID_USER_DATA)?;
        let mut note = self.fixtures.load(INVALID_NOTE_DATA)?;
        let mut api = self.fixtures.load(INVALID_API_DATA)?;

        self.replacer.replace_placeholder(&mut user, "userData", "longPassword");
        self.replacer.replace_placeholder(&mut note, "noteData", "longTitle");
        self.replacer.replace_placeholder(&mut api, "apiData", "extremelyLargePayload");

        Ok(InvalidFixtureData { user, note, api })
    }

    pub fn get_valid_data_from_fixtures(&self) -> E2eResult<ValidFixtureData> {
        let mut note = self.fixtures.load(NOTE_DATA)?;

        self.replacer.replace_placeholder(&mut note, "noteData", "validNote");
        self.replacer.replace_placeholder(&mut note, "noteData", "titleOnlyNote");

        Ok(ValidFixtureData { note })
    }

    /// One note from `noteData.json`, placeholders substituted
    pub fn get_note_from_fixture(&self, note_type: &str) -> E2eResult<NoteCreate> {
        let note = self.fixtures.entry(NOTE_DATA, note_type)?;
        self.fixture_note(note_type, note)
    }

    /// Every note in `noteData.json`, placeholders substituted
    pub fn get_all_notes_from_fixtures(&self) -> E2eResult<BTreeMap<String, NoteCreate>> {
        let all = self.fixtures.load(NOTE_DATA)?;
        let Value::Object(entries) = all else {
            return Err(E2eError::FixtureShape(NOTE_DATA.to_string()));
        };

        entries
            .into_iter()
            .map(|(note_type, note)| {
                let created = self.fixture_note(&note_type, note)?;
                Ok((note_type, created))
            })
            .collect()
    }

    fn fixture_note(&self, note_type: &str, note: Value) -> E2eResult<NoteCreate> {
        let mut holder = Value::Object(serde_json::Map::new());
        holder[note_type] = note;
        self.replacer.replace_placeholder(&mut holder, "noteData", note_type);
        Ok(serde_json::from_value(holder[note_type].take())?)
    }
}
