pub mod handlers;
pub mod prompt;
pub mod session;
pub mod webhook;
