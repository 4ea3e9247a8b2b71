// Service exports
pub mod cache;
pub mod inference;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::EmbeddingCache;
pub use inference::{EmbeddingModel, HttpEmbeddingModel, HttpToxicityModel, Label, ModelError, ToxicityModel};
pub use memory::{InMemoryProfileStore, Seed};
pub use postgres::PostgresProfileStore;
pub use store::{ProfileStore, StoreError};
