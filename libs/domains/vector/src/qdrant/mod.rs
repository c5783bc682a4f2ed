mod client;
mod config;
pub mod convert;

pub use client::{QdrantVectorIndex, point_id};
pub use config::QdrantConfig;
