//! Synchronization with the authoritative scoring service: the only layer in
//! the crate that performs I/O. Local mutations are applied optimistically and
//! rolled back in full when the remote call fails; inbound push events always
//! supersede optimistic state.

mod adapter;
mod http;
mod push;
mod service;

pub use adapter::{ScoreSync, SyncError};
pub use http::HttpScoreService;
pub use push::{apply_push, MatchPatch, PushEvent};
pub use service::{ScoreService, ServePatch, ServiceError};
