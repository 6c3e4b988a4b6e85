//! Source positions and spans for t4-check-rs.
//!
//! Every token and syntax node produced by `t4-syntax` carries a [`Span`]
//! (a half-open byte range into the original text) and a [`Position`]
//! (the human-facing line/column of its first character). The two are
//! independent: spans are for slicing and containment tests, positions are
//! for diagnostics and navigation. [`LineIndex`] converts between them for
//! consumers that only hold a span.

mod line_index;
mod position;
mod span;

pub use line_index::LineIndex;
pub use position::Position;
pub use span::{ByteOffset, Span};
