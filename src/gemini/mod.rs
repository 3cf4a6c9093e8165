pub mod ideas_client;

pub use ideas_client::{parse_ideas, IdeasClient};
