// Core modules: row model, decoding seam, normalization, range reading, JSON framing.
pub mod error;
pub mod json_array;
pub mod memory;
pub mod normalize;
pub mod parquet_source;
pub mod range;
pub mod range_reader;
pub mod row;
pub mod source;
