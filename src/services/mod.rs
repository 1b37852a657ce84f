pub mod aggregator;
pub mod builder;
pub mod export;
pub mod storage;
