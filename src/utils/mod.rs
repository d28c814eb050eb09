pub mod data;
pub mod stats_merge;
