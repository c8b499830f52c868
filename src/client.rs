//! Chat client side: requester plus the widget's fallback logic

mod requester;
mod session;

#[allow(unused_imports)] // Public API re-exports
pub use requester::{RequestError, ResilientRequester, DEFAULT_RETRY_DELAY};
#[allow(unused_imports)] // Public API re-exports
pub use session::{BotReply, ChatSession, ReplySource};
