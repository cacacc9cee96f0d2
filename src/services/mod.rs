pub mod backend;
pub mod reveal;
pub mod session;

pub use backend::{BlendBackend, HttpBackend, TestBlendRequest};
pub use reveal::{RevealHandle, RevealScheduler, RevealState};
pub use session::{BlendSession, SessionState};
