pub mod client;
pub mod messages;

pub use client::{HttpQueryClient, QueryError, QueryService};
pub use messages::{VoiceQueryRequest, VoiceQueryResponse};
