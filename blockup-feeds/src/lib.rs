//! Atom and RSS vocabularies declared on top of [`blockup`].
//!
//! Each vocabulary exposes its element types as `LazyLock` statics, so they
//! can be reused and extended, plus a constructor for its document root.

pub mod atom;
pub mod rss;
