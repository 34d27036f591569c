pub mod conversation;
pub mod profile;
pub mod prompt;
pub mod session;
