// Posts — the input record model and timestamp validation.

pub mod models;
pub mod timestamp;
