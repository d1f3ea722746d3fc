mod backend;
mod notice;
mod session;

pub use backend::{into_chat_data, ChatBackend, HttpBackend};
pub use notice::{Notice, NoticeLevel};
pub use session::{ChatSession, EMPTY_RESPONSE_FALLBACK};
