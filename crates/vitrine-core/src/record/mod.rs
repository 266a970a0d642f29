//! Records and the pure steps applied to them.
//!
//! Decoding ([`parse_record`], [`parse_counter`]) and ordering ([`SortKey`])
//! live here; fetching and paging live in the `vitrine` crate.

mod parse;
mod sort;
mod types;

pub use parse::{
    Payload, decode_counter, decode_record, parse_counter, parse_record, sniff,
};
pub use sort::{SortKey, parse_timestamp, timestamp_in_key};
pub use types::{CounterRecord, PageResult, PageRow, Record};
