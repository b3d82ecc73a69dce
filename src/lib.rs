//! Per-key min/max/mean/count over large `key;value` files, computed by
//! scanning disjoint byte ranges in parallel and merging the partial results.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod generate;
pub mod output;
pub mod parse;
pub mod store;
pub mod worker;

pub use config::Config;
pub use coordinator::{calculate, calculate_with, partition};
pub use error::{Error, GenerateError, ParseError, Result};
pub use parse::{Reading, parse_line};
pub use store::{Aggregate, AggregateStore, merge_all};
pub use worker::{ByteRange, scan_range};
