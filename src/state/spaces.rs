//! Space-list state for the landing view.

#[cfg(test)]
#[path = "spaces_test.rs"]
mod spaces_test;

use tracing::warn;

use super::{FormError, LoadStatus, Sequencer, SubmitError, Ticket};
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::Space;

/// Fields of the "create space" dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateSpaceForm {
    pub open: bool,
    pub name: String,
    pub description: String,
    pub pending: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SpacesListState {
    pub items: Vec<Space>,
    pub status: LoadStatus,
    pub error: Option<String>,
    pub create: CreateSpaceForm,
    seq: Sequencer,
}

impl SpacesListState {
    pub fn begin_load(&mut self) -> Ticket {
        self.status = LoadStatus::Loading;
        self.error = None;
        self.seq.issue()
    }

    /// Apply a list result. Errors keep the previous items on screen.
    pub fn finish_load(&mut self, ticket: Ticket, result: Result<Vec<Space>, &ApiError>) -> bool {
        if !self.seq.is_current(ticket) {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.status = LoadStatus::Ready;
            }
            Err(err) => {
                warn!(error = %err, "loading spaces failed");
                self.status = LoadStatus::Error;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Fetch the list. Also serves as the manual retry / refresh action.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in `self.error`.
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let ticket = self.begin_load();
        match api.get_spaces().await {
            Ok(items) => {
                self.finish_load(ticket, Ok(items));
                Ok(())
            }
            Err(err) => {
                self.finish_load(ticket, Err(&err));
                Err(err)
            }
        }
    }

    pub fn open_create(&mut self) {
        self.create.open = true;
    }

    /// Close the dialog and discard its fields.
    pub fn cancel_create(&mut self) {
        self.create = CreateSpaceForm::default();
        self.error = None;
    }

    /// Submit the dialog. The new space is appended to the list as returned.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::EmptyName`] without a request for a blank name,
    /// or the API error, which also stays in `self.error` with the dialog open.
    pub async fn submit_create(&mut self, api: &ApiClient) -> Result<Space, SubmitError> {
        let name = self.create.name.trim().to_owned();
        if name.is_empty() {
            return Err(FormError::EmptyName.into());
        }
        let description = self.create.description.trim().to_owned();

        self.create.pending = true;
        self.error = None;
        let result = api
            .create_space(&name, (!description.is_empty()).then_some(description.as_str()), None)
            .await;
        self.create.pending = false;

        match result {
            Ok(space) => {
                self.items.push(space.clone());
                self.create = CreateSpaceForm::default();
                Ok(space)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}
