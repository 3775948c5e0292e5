//! Session state and background loading.

mod load_worker;
mod session;

pub use load_worker::{LoadOutcome, LoadRequest, LoadToken, LoadWorker};
pub use session::{LoadedCube, Session};
