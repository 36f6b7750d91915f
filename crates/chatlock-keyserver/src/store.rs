//! Persistence boundary for the session key protocol.
//!
//! The protocol engine only ever talks to an [`ExchangeStore`]; how the
//! records are backed (database, file, memory) is a collaborator concern.
//! The one hard requirement is that `create_room_parameters_if_absent` is
//! atomic: concurrent first contacts for a room must all observe the same
//! winning record, never two different chat keys.

use std::collections::HashMap;
use std::sync::Mutex;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::KeyExchangeError;

/// Length of a room's symmetric chat key in bytes.
pub const CHAT_KEY_SIZE: usize = 32;

/// Length of a room's chat IV in bytes.
pub const CHAT_IV_SIZE: usize = 16;

/// Established parameters and key material for one chat room.
///
/// Generated exactly once per room and reused for every participant.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomParameters {
    /// Prime modulus for the room's DH exchanges.
    pub p: BigUint,
    /// Generator for the room's DH exchanges.
    pub g: BigUint,
    /// The room's shared symmetric chat key.
    pub chat_key: Vec<u8>,
    /// The room's shared chat IV.
    pub chat_iv: Vec<u8>,
}

impl Drop for RoomParameters {
    fn drop(&mut self) {
        self.chat_key.zeroize();
        self.chat_iv.zeroize();
    }
}

impl std::fmt::Debug for RoomParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomParameters")
            .field("p", &self.p)
            .field("g", &self.g)
            .field("chat_key", &"[REDACTED]")
            .field("chat_iv", &"[REDACTED]")
            .finish()
    }
}

/// One participant's completed key exchange for a room.
#[derive(Clone, Serialize, Deserialize)]
pub struct ParticipantExchange {
    /// Server-side ephemeral private exponent for this participant.
    pub server_private: BigUint,
    /// Server-side ephemeral public value sent to the participant.
    pub server_public: BigUint,
    /// The participant's supplied public value.
    pub client_public: BigUint,
    /// The room chat key, wrapped under the participant's wrapping key.
    pub wrapped_chat_key: Vec<u8>,
    /// The room chat IV, wrapped under the participant's wrapping key.
    pub wrapped_chat_iv: Vec<u8>,
    /// Prime modulus the exchange ran under.
    pub p: BigUint,
    /// Generator the exchange ran under.
    pub g: BigUint,
}

impl std::fmt::Debug for ParticipantExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantExchange")
            .field("server_private", &"[REDACTED]")
            .field("server_public", &self.server_public)
            .field("client_public", &self.client_public)
            .finish()
    }
}

/// Persistence operations the protocol engine depends on.
pub trait ExchangeStore: Send + Sync {
    /// Fetch a room's established parameters, if any.
    fn room_parameters(&self, room_id: &str) -> Result<Option<RoomParameters>, KeyExchangeError>;

    /// Insert parameters for a room unless some already exist, returning
    /// the record that won. Must be atomic with respect to concurrent
    /// calls for the same room.
    fn create_room_parameters_if_absent(
        &self,
        room_id: &str,
        params: RoomParameters,
    ) -> Result<RoomParameters, KeyExchangeError>;

    /// Persist one participant's completed exchange.
    fn save_participant_exchange(
        &self,
        room_id: &str,
        user_id: &str,
        record: ParticipantExchange,
    ) -> Result<(), KeyExchangeError>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    rooms: Mutex<HashMap<String, RoomParameters>>,
    exchanges: Mutex<HashMap<(String, String), ParticipantExchange>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up one participant's stored exchange record.
    pub fn participant_exchange(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<ParticipantExchange>, KeyExchangeError> {
        let exchanges = lock(&self.exchanges)?;
        Ok(exchanges
            .get(&(room_id.to_string(), user_id.to_string()))
            .cloned())
    }

    /// Number of stored participant exchanges across all rooms.
    pub fn exchange_count(&self) -> Result<usize, KeyExchangeError> {
        Ok(lock(&self.exchanges)?.len())
    }
}

/// Lock a store mutex, mapping poisoning into a store error.
fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, KeyExchangeError> {
    mutex
        .lock()
        .map_err(|_| KeyExchangeError::Store("store mutex poisoned".to_string()))
}

impl ExchangeStore for MemoryStore {
    fn room_parameters(&self, room_id: &str) -> Result<Option<RoomParameters>, KeyExchangeError> {
        Ok(lock(&self.rooms)?.get(room_id).cloned())
    }

    fn create_room_parameters_if_absent(
        &self,
        room_id: &str,
        params: RoomParameters,
    ) -> Result<RoomParameters, KeyExchangeError> {
        // Holding the map lock across the entry lookup and insert is what
        // makes this atomic: a losing concurrent insert is discarded and
        // the caller proceeds with the winner.
        let mut rooms = lock(&self.rooms)?;
        Ok(rooms.entry(room_id.to_string()).or_insert(params).clone())
    }

    fn save_participant_exchange(
        &self,
        room_id: &str,
        user_id: &str,
        record: ParticipantExchange,
    ) -> Result<(), KeyExchangeError> {
        let mut exchanges = lock(&self.exchanges)?;
        exchanges.insert((room_id.to_string(), user_id.to_string()), record);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_params(seed: u8) -> RoomParameters {
        RoomParameters {
            p: BigUint::from(23u32),
            g: BigUint::from(2u32),
            chat_key: vec![seed; CHAT_KEY_SIZE],
            chat_iv: vec![seed; CHAT_IV_SIZE],
        }
    }

    #[test]
    fn absent_room_returns_none() {
        let store = MemoryStore::new();
        assert!(store.room_parameters("room-1").unwrap().is_none());
    }

    #[test]
    fn create_if_absent_inserts_then_returns_existing() {
        let store = MemoryStore::new();

        let winner = store
            .create_room_parameters_if_absent("room-1", sample_params(1))
            .unwrap();
        assert_eq!(winner.chat_key, vec![1u8; CHAT_KEY_SIZE]);

        // A later create with different material loses silently.
        let still_winner = store
            .create_room_parameters_if_absent("room-1", sample_params(2))
            .unwrap();
        assert_eq!(still_winner.chat_key, vec![1u8; CHAT_KEY_SIZE]);

        let fetched = store.room_parameters("room-1").unwrap().unwrap();
        assert_eq!(fetched, winner);
    }

    #[test]
    fn rooms_are_independent() {
        let store = MemoryStore::new();
        store
            .create_room_parameters_if_absent("room-1", sample_params(1))
            .unwrap();
        store
            .create_room_parameters_if_absent("room-2", sample_params(2))
            .unwrap();

        let one = store.room_parameters("room-1").unwrap().unwrap();
        let two = store.room_parameters("room-2").unwrap().unwrap();
        assert_ne!(one.chat_key, two.chat_key);
    }

    #[test]
    fn participant_exchange_roundtrip() {
        let store = MemoryStore::new();
        let record = ParticipantExchange {
            server_private: BigUint::from(5u32),
            server_public: BigUint::from(9u32),
            client_public: BigUint::from(4u32),
            wrapped_chat_key: vec![0xAA; 32],
            wrapped_chat_iv: vec![0xBB; 16],
            p: BigUint::from(23u32),
            g: BigUint::from(2u32),
        };

        store
            .save_participant_exchange("room-1", "alice", record.clone())
            .unwrap();

        let loaded = store
            .participant_exchange("room-1", "alice")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.server_public, record.server_public);
        assert_eq!(loaded.wrapped_chat_key, record.wrapped_chat_key);
        assert!(store.participant_exchange("room-1", "bob").unwrap().is_none());
        assert_eq!(store.exchange_count().unwrap(), 1);
    }

    #[test]
    fn debug_impls_redact_key_material() {
        let params = sample_params(7);
        let output = format!("{params:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("chat_key: [7"));

        let record = ParticipantExchange {
            server_private: BigUint::from(1234_5678u32),
            server_public: BigUint::from(9u32),
            client_public: BigUint::from(4u32),
            wrapped_chat_key: vec![],
            wrapped_chat_iv: vec![],
            p: BigUint::from(23u32),
            g: BigUint::from(2u32),
        };
        let output = format!("{record:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("12345678"));
    }
}
