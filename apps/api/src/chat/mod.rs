// Chat relay: composes the system prompt for the request's ref and forwards
// the conversation to the configured language model.

pub mod handlers;
