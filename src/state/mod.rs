//! View state owned by each screen.
//!
//! DESIGN
//! ======
//! Each view owns a plain struct; nothing is process-wide. Loads are
//! server-authoritative: mutations are submitted and the space is re-fetched,
//! never patched locally. Every in-flight load or selection carries a
//! `Ticket` so a slow earlier response cannot overwrite a newer one.

pub mod node;
pub mod space;
pub mod spaces;


use crate::net::error::ApiError;

/// Lifecycle of one fetch-backed piece of view state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is outstanding.
    Loading,
    /// The last request succeeded.
    Ready,
    /// The last request failed; prior data, if any, is still shown.
    Error,
}

/// Sequence number identifying one issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out tickets and remembers the newest one.
#[derive(Clone, Debug, Default)]
pub struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Local validation failures; no request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("title is required")]
    EmptyTitle,

    #[error("space name is required")]
    EmptyName,

    #[error("no node form is open")]
    NoModal,

    #[error("node {0} is not in this space")]
    UnknownNode(String),
}

/// Failure of a form submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The mutation went through but the follow-up reload did not.
    #[error("change saved but reload failed: {0}")]
    Reload(ApiError),
}
