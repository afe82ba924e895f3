//! Display helpers shared by validation messages, roll summaries and
//! sheet text.

use std::fmt;

/// Displays a rating or modifier with an explicit sign: `+2`, `+0`, `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signed(pub i32);

impl fmt::Display for Signed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
