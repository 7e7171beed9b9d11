//! Outcome of a cleanup pass

use serde::Serialize;

use practice_api::{ApiResponse, ApiResult};

/// Entity a deletion was attempted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackedEntity {
    Note { id: String },
    User { email: String },
}

impl TrackedEntity {
    pub fn is_note(&self) -> bool {
        matches!(self, TrackedEntity::Note { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// The service accepted the deletion
    Deleted { status: u16 },
    /// The service answered with an error status
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// The request never completed
    Failed { error: String },
}

impl CleanupOutcome {
    pub fn from_result(result: ApiResult<ApiResponse>) -> Self {
        match result {
            Ok(response) if response.is_success() => CleanupOutcome::Deleted {
                status: response.status,
            },
            Ok(response) => CleanupOutcome::Rejected {
                status: response.status,
                message: response.message().map(str::to_string),
            },
            Err(e) => CleanupOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, CleanupOutcome::Deleted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupEntry {
    pub entity: TrackedEntity,
    pub outcome: CleanupOutcome,
}

/// Every deletion attempted, in the order issued
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub entries: Vec<CleanupEntry>,
}

impl CleanupReport {
    pub fn push(&mut self, entity: TrackedEntity, outcome: CleanupOutcome) {
        self.entries.push(CleanupEntry { entity, outcome });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn deleted(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_deleted()).count()
    }

    /// Entries whose deletion did not succeed, i.e. possibly leaked remote data
    pub fn failures(&self) -> impl Iterator<Item = &CleanupEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_deleted())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
