pub mod analyzer;
pub mod comparator;
pub mod config;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod session;
pub mod utils;

pub use comparator::Comparator;
pub use model::{Catalog, ComparisonRequest, ComparisonResult, Priorities, Product};
pub use session::ComparisonSession;
