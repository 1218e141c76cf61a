//! Text command front end.
//!
//! ```text
//!  "!plug bob Bo 2" ──► split_verb ──► privilege check ──► Command::parse
//!                                                              │
//!  Reply ◄── render::{outcome, error} ◄── Engine op ◄── execute ┘
//! ```

mod dispatch;
mod parse;
pub mod render;

pub use dispatch::{dispatch, execute};
pub use parse::{Command, UnknownVerb, Verb, split_verb};
pub use render::Reply;
