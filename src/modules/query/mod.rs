pub mod extractor;
pub mod oracle;
pub mod resolver;

pub use extractor::{FilterExtractor, Metric, QueryFilter};
pub use oracle::{AiOracle, GeminiOracle};
pub use resolver::{Answer, QueryResolver};
