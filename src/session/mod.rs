mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, SESSION_KEY};
pub use store::{Identity, Session, SessionStore};
