pub mod error;
pub mod index;
pub mod matching;
pub mod similarity;
pub mod vectorize;

pub use error::RecommendError;
pub use index::{Recommendation, Recommended, Recommender, DEFAULT_TOP_K};
