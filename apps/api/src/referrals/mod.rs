// Referral tracking: capture a ref from the URL, persist it in a cookie,
// and expose it to handlers through the request-scoped RefContext.

pub mod context;
pub mod handlers;
pub mod resolver;
pub mod store;

pub use context::RefContext;
pub use store::RefStore;
