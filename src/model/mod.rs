//! Canonical record model emitted by every format writer.
//!
//! Regardless of the input format, a document becomes an ordered list of
//! [`Record`]s: a node kind, a string identity, a flat-ish attribute map and
//! outgoing edges grouped by [`Relation`]. Downstream graph construction only
//! needs this vocabulary, never the source format.

mod record;

pub use record::*;
