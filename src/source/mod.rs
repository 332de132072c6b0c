// Post sources — JSON files and the GraphQL posts endpoint.

pub mod file;
pub mod graphql;
pub mod traits;

pub use file::FileSource;
pub use graphql::GraphqlSource;
pub use traits::{clamp_amount, PostSource, DEFAULT_AMOUNT, MAX_AMOUNT};
