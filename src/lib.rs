// postlens: monthly topic distribution and topic correlation for tagged posts
//
// This is the library root. `grouping` and `correlation` are the pure
// engines; `source` and `output` are the edges the CLI wires around them.

pub mod config;
pub mod correlation;
pub mod error;
pub mod grouping;
pub mod output;
pub mod posts;
pub mod source;
