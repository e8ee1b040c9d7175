//! Document source strategies.
//!
//! Only the filesystem strategy exists. The checkers themselves work on
//! `(content, path)` pairs, so another source only needs to produce those.

pub mod fs;
