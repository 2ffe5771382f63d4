// Results viewer: cache-or-fetch activation, the results page model, and the
// session-scoped HTTP surface.

use thiserror::Error;

pub mod handlers;
pub mod page;
pub mod session;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("superseded by a newer activation")]
    Superseded,
}
