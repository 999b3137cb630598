//! Command interpreter: actions, parsing, responses and admin notices.

pub mod action;
pub mod interpreter;
pub mod notice;
pub mod parse;
pub mod render;

pub use action::{Action, ListFilter};
pub use interpreter::Interpreter;
pub use notice::AdminNotice;
pub use parse::{OrderSpec, parse_order_spec};
pub use render::{MenuOption, Response};
