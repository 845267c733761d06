//! codesweep — static hygiene sweeps for Rust source trees.
//!
//! A set of small, independent tools that enforce project conventions by
//! mechanical, regex-driven rewriting of source files: disable or delete
//! runnable example fences in doc comments, normalize TODO/FIXME comments,
//! remove commented-out tests, detect `use` statements that split module
//! paths, and generate `mod.rs` re-export files. Every sweep reads a file,
//! applies line-oriented patterns, and (under `--apply`) rewrites it in
//! place after keeping a sibling backup. There is deliberately no parser
//! and no AST; the sweeps accept heuristic imprecision in exchange for
//! staying simple.

pub mod builders;
pub mod core;
pub mod utils;
