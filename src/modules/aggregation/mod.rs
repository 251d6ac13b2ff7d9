pub mod engine;

pub use engine::{
    aggregate, AggregationResult, AggregationScope, Dimension, GroupKey, Totals,
};
