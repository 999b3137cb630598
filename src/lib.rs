//! Order broker: a chat bot where an administrator posts orders and
//! workers claim and release them.

pub mod bot;
pub mod channels;
pub mod commands;
pub mod config;
pub mod error;
pub mod orders;
