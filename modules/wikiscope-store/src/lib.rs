pub mod aggregate;
pub mod cache;
pub mod client;
pub mod slice;
pub mod source;
pub mod testing;

pub use aggregate::Aggregator;
pub use cache::TtlCache;
pub use client::StoreClient;
pub use slice::load_slice;
pub use source::DocumentSource;
