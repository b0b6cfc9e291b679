pub mod range;
pub mod wiggly;

pub use range::{RangeSelector, UnitOrder};
pub use wiggly::WigglySelector;

use std::fmt;

/// The three selector mechanisms, in the order an animator applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Range,
    Wiggly,
    Expression,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectorKind::Range => "range",
            SelectorKind::Wiggly => "wiggly",
            SelectorKind::Expression => "expression",
        })
    }
}
