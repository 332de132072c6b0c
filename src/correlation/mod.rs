// Correlation — pairwise topic overlap scores.

pub mod matrix;

pub use matrix::{correlate, count_overlaps, CorrelationBin, CorrelationMatrix, CorrelationRow};
