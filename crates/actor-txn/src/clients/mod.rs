//! Type-safe clients wrapping the actor references of each kind.

pub mod directory;
pub mod participant_client;
pub mod transaction_client;

pub use directory::ParticipantDirectory;
pub use participant_client::ParticipantClient;
pub use transaction_client::TransactionClient;
