//! Notes endpoints

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiResult;
use crate::response::{ApiResponse, ResponseValue};
use crate::types::{NoteCreate, NoteUpdate};
use crate::validate::{self, STATUS_OK};

/// Client for the `/notes` endpoints
#[derive(Debug, Clone)]
pub struct NotesApi {
    client: ApiClient,
}

impl NotesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn notes_path(&self) -> ApiResult<String> {
        Ok(self.client.endpoint("notes_url")?.to_string())
    }

    fn note_path(&self, note_id: &str) -> ApiResult<String> {
        Ok(format!("{}/{}", self.client.endpoint("notes_url")?, note_id))
    }

    /// Create a note. Any serializable payload is accepted so malformed
    /// notes can be posted as well.
    pub async fn create<B: Serialize + ?Sized>(&self, token: &str, note_data: &B) -> ApiResult<ApiResponse> {
        let options = RequestOptions::post(self.notes_path()?)
            .json(note_data)?
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    /// List the caller's notes, optionally filtered by query parameters
    pub async fn get_all(&self, token: &str, query: &[(&str, String)]) -> ApiResult<ApiResponse> {
        let mut options =
            RequestOptions::get(self.notes_path()?).headers(self.client.get_auth_headers(token));
        for (key, value) in query {
            options = options.query(*key, value);
        }
        self.client.request(options).await
    }

    pub async fn get_by_id(&self, token: &str, note_id: &str) -> ApiResult<ApiResponse> {
        let options = RequestOptions::get(self.note_path(note_id)?)
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    /// Full update (PUT)
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        token: &str,
        note_id: &str,
        note_data: &B,
    ) -> ApiResult<ApiResponse> {
        let options = RequestOptions::put(self.note_path(note_id)?)
            .json(note_data)?
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    /// Partial update (PATCH)
    pub async fn patch(&self, token: &str, note_id: &str, note_data: &NoteUpdate) -> ApiResult<ApiResponse> {
        let options = RequestOptions::patch(self.note_path(note_id)?)
            .json(note_data)?
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    pub async fn delete(&self, token: &str, note_id: &str) -> ApiResult<ApiResponse> {
        let options = RequestOptions::delete(self.note_path(note_id)?)
            .headers(self.client.get_auth_headers(token));
        self.client.request(options).await
    }

    /// Free-text search; `extra` parameters are appended after `search`
    pub async fn search(
        &self,
        token: &str,
        search_term: &str,
        extra: &[(&str, String)],
    ) -> ApiResult<ApiResponse> {
        let mut query = vec![("search", search_term.to_string())];
        query.extend(extra.iter().cloned());
        self.get_all(token, &query).await
    }

    pub async fn filter_by_completion(&self, token: &str, completed: bool) -> ApiResult<ApiResponse> {
        self.get_all(token, &[("completed", completed.to_string())]).await
    }

    /// Dates are ISO strings, passed through untouched
    pub async fn filter_by_date_range(
        &self,
        token: &str,
        from_date: &str,
        to_date: &str,
    ) -> ApiResult<ApiResponse> {
        self.get_all(
            token,
            &[("from", from_date.to_string()), ("to", to_date.to_string())],
        )
        .await
    }

    pub async fn toggle_completion(&self, token: &str, note_id: &str, completed: bool) -> ApiResult<ApiResponse> {
        self.patch(token, note_id, &NoteUpdate::completed(completed)).await
    }

    /// Fire one create per note concurrently. Results keep input order and a
    /// failed item never cancels its siblings.
    pub async fn create_multiple(&self, token: &str, notes: &[NoteCreate]) -> Vec<ApiResult<ApiResponse>> {
        join_all(notes.iter().map(|note| self.create(token, note))).await
    }

    /// Fire one delete per id concurrently, results in input order
    pub async fn delete_multiple(&self, token: &str, note_ids: &[String]) -> Vec<ApiResult<ApiResponse>> {
        join_all(note_ids.iter().map(|id| self.delete(token, id))).await
    }

    /// Delete every note the token owns. `None` when there was nothing to delete.
    pub async fn cleanup(&self, token: &str) -> ApiResult<Option<Vec<ApiResult<ApiResponse>>>> {
        let response = self.get_all(token, &[]).await?;

        let ids: Vec<String> = response
            .data()
            .and_then(Value::as_array)
            .map(|notes| {
                notes
                    .iter()
                    .filter_map(|note| note.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if ids.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.delete_multiple(token, &ids).await))
    }

    /// Required fields present and typed; timestamps parse as dates
    pub fn validate_note_structure(&self, note: &Value) -> ApiResult<()> {
        validate::expect_non_empty_string(note, "note", "id")?;
        validate::expect_string(note, "note", "title")?;
        validate::expect_non_empty_string(note, "note", "description")?;
        validate::expect_date(note, "note", "created_at")?;
        validate::expect_date(note, "note", "updated_at")?;
        Ok(())
    }

    /// Envelope check, plus every listed note on 200
    pub fn validate_notes_list_response(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.client.normalize_response(response);
        validate::validate_standard_response(&response, expected_status)?;

        if expected_status == STATUS_OK {
            for note in validate::expect_array(&response.body, "body", "data")? {
                self.validate_note_structure(note)?;
            }
        }
        Ok(())
    }

    /// Envelope check, plus the note in `data` on 200
    pub fn validate_note_response(
        &self,
        response: impl Into<ResponseValue>,
        expected_status: u16,
    ) -> ApiResult<()> {
        let response = self.client.normalize_response(response);
        validate::validate_standard_response(&response, expected_status)?;

        if expected_status == STATUS_OK {
            let note = validate::expect_property(&response.body, "body", "data")?;
            self.validate_note_structure(note)?;
        }
        Ok(())
    }
}
