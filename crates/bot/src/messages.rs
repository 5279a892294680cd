//! Reply texts sent to users.

pub const HELP: &str = "I can save and keep your pages. I can also offer you a page to read.

To save a page, just send me a link to it.

To get a random page from your list, send me /rnd.
Caution: after that, this page will be removed from your list!";

pub const UNKNOWN_COMMAND: &str = "Unknown command 🤔";
pub const NO_SAVED_PAGES: &str = "You have no saved pages 🙊";
pub const SAVED: &str = "Saved! 👌";
pub const ALREADY_EXISTS: &str = "You already have this page in your list 🤗";

/// Greeting for `/start`: a hello line followed by the help text.
pub fn hello() -> String {
    format!("Hi there! 👾\n\n{HELP}")
}
