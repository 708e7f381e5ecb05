//! Orchestration session: the single owner of view, draft, current result and the
//! export rendezvous.

mod service;
mod state;

pub use service::{AssessmentSession, SessionError, SubmitError};
pub use state::{Notice, NoticeKind, SessionSnapshot, View};
