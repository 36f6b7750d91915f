//! Chatlock session key protocol.
//!
//! Server-mediated establishment of one shared symmetric chat key per
//! room, delivered to each participant over a per-participant
//! Diffie-Hellman exchange:
//!
//! - **Store**: the persistence boundary, with an atomic
//!   create-if-absent so concurrent first contacts agree on one key
//! - **Engine**: the server role - room establishment, per-participant
//!   exchange, chat key wrapping
//! - **Client helper**: [`unwrap_chat_key`] recovers the room key from a
//!   response

pub mod error;
pub mod exchange;
pub mod store;

pub use error::KeyExchangeError;
pub use exchange::{KeyExchangeEngine, KeyExchangeResponse, RoomHandshake, unwrap_chat_key};
pub use store::{
    CHAT_IV_SIZE, CHAT_KEY_SIZE, ExchangeStore, MemoryStore, ParticipantExchange, RoomParameters,
};
