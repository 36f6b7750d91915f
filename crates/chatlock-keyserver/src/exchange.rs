//! Server-mediated session key establishment.
//!
//! Each chat room owns exactly one symmetric chat key. The first contact
//! for a room generates the room's DH parameters and chat key atomically;
//! every contact (first or later) then runs a fresh per-participant DH
//! exchange whose shared secret, hashed, becomes the wrapping key under
//! which the room's chat key and IV are delivered. The chat key itself
//! never crosses the wire in plaintext.

use chatlock_core::ExchangeConfig;
use chatlock_crypto::{
    Algorithm, CipherSuite, DhKeyPair, DhParameters, Mode, Padding, random_prime,
};
use num_bigint::BigUint;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::KeyExchangeError;
use crate::store::{
    CHAT_IV_SIZE, CHAT_KEY_SIZE, ExchangeStore, ParticipantExchange, RoomParameters,
};

/// Room parameters handed to a participant so it can generate its key
/// pair before initiating an exchange. Big integers travel as decimal
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomHandshake {
    pub p: String,
    pub g: String,
}

/// The server's reply to one participant's exchange request.
///
/// Big integers are decimal strings; wrapped buffers are hex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyExchangeResponse {
    pub server_public: String,
    pub p: String,
    pub g: String,
    pub wrapped_chat_key: String,
    pub wrapped_chat_iv: String,
}

/// The server half of the session key protocol.
pub struct KeyExchangeEngine<S> {
    store: S,
    config: ExchangeConfig,
}

/// The chat key and IV are wrapped block-at-a-time with no chaining; both
/// payloads are multiples of the 8-byte Feistel64 block, and the SHA-256
/// wrapping key is exactly a Feistel64 key.
const fn wrap_suite() -> CipherSuite {
    CipherSuite::new(Algorithm::Feistel64, Mode::Ecb, Padding::None)
}

/// Derive the wrapping key by hashing the shared-secret bytes.
fn wrapping_key(shared_secret: &BigUint) -> [u8; 32] {
    Sha256::digest(shared_secret.to_bytes_be()).into()
}

impl<S: ExchangeStore> KeyExchangeEngine<S> {
    /// Build an engine over a store with the given generation settings.
    pub const fn new(store: S, config: ExchangeConfig) -> Self {
        Self { store, config }
    }

    /// Fetch a room's parameters, establishing the room on first contact.
    ///
    /// The returned `(p, g)` let the participant generate its key pair
    /// before calling [`KeyExchangeEngine::initiate`].
    pub fn room_handshake(&self, room_id: &str) -> Result<RoomHandshake, KeyExchangeError> {
        let room = self.ensure_room(room_id)?;
        Ok(RoomHandshake {
            p: room.p.to_string(),
            g: room.g.to_string(),
        })
    }

    /// Run one participant's key exchange.
    ///
    /// `client_public` is the participant's public value as a decimal
    /// string, generated under the room's `(p, g)`. Returns the server's
    /// ephemeral public value plus the room's chat key and IV wrapped
    /// under SHA-256 of the DH shared secret.
    pub fn initiate(
        &self,
        room_id: &str,
        user_id: &str,
        client_public: &str,
    ) -> Result<KeyExchangeResponse, KeyExchangeError> {
        let client_public: BigUint = client_public
            .parse()
            .map_err(|_| KeyExchangeError::MalformedPublicKey)?;

        let room = self.ensure_room(room_id)?;
        let params = DhParameters::new(room.p.clone(), room.g.clone());

        // Fresh server-side pair per participant; the room key stays the
        // same, the wrapping key never repeats.
        let server_pair = DhKeyPair::generate(&params);
        let shared = server_pair.shared_secret(&client_public)?;
        let wrap_key = wrapping_key(&shared);

        let suite = wrap_suite();
        let wrapped_chat_key = suite.encrypt(&room.chat_key, &wrap_key, None)?;
        let wrapped_chat_iv = suite.encrypt(&room.chat_iv, &wrap_key, None)?;

        self.store.save_participant_exchange(
            room_id,
            user_id,
            ParticipantExchange {
                server_private: server_pair.private().clone(),
                server_public: server_pair.public().clone(),
                client_public,
                wrapped_chat_key: wrapped_chat_key.clone(),
                wrapped_chat_iv: wrapped_chat_iv.clone(),
                p: room.p.clone(),
                g: room.g.clone(),
            },
        )?;
        info!(room_id, user_id, "participant key exchange recorded");

        Ok(KeyExchangeResponse {
            server_public: server_pair.public().to_string(),
            p: room.p.to_string(),
            g: room.g.to_string(),
            wrapped_chat_key: hex::encode(wrapped_chat_key),
            wrapped_chat_iv: hex::encode(wrapped_chat_iv),
        })
    }

    /// Read-only lookup of an established room's parameters, for
    /// collaborators encrypting message traffic with the room key.
    pub fn established_parameters(
        &self,
        room_id: &str,
    ) -> Result<RoomParameters, KeyExchangeError> {
        self.store
            .room_parameters(room_id)?
            .ok_or_else(|| KeyExchangeError::RoomNotFound(room_id.to_string()))
    }

    /// Get the room's parameters, generating and persisting them exactly
    /// once per room.
    ///
    /// Generation happens outside any lock; the store's atomic
    /// create-if-absent decides the winner, and a losing candidate is
    /// simply dropped. Every caller proceeds with the winning record.
    fn ensure_room(&self, room_id: &str) -> Result<RoomParameters, KeyExchangeError> {
        if let Some(room) = self.store.room_parameters(room_id)? {
            return Ok(room);
        }

        let candidate = self.generate_room_parameters();
        debug!(
            room_id,
            bits = self.config.prime_bits,
            "proposing parameters for new room"
        );
        self.store
            .create_room_parameters_if_absent(room_id, candidate)
    }

    /// Fresh DH parameters plus a random chat key and IV for a new room.
    fn generate_room_parameters(&self) -> RoomParameters {
        let p = random_prime(self.config.prime_bits, self.config.primality_rounds);
        let mut chat_key = vec![0u8; CHAT_KEY_SIZE];
        OsRng.fill_bytes(&mut chat_key);
        let mut chat_iv = vec![0u8; CHAT_IV_SIZE];
        OsRng.fill_bytes(&mut chat_iv);
        RoomParameters {
            p,
            g: BigUint::from(2u32),
            chat_key,
            chat_iv,
        }
    }
}

/// The participant half: recover the room's chat key and IV from the
/// server's response using the key pair the exchange was initiated with.
pub fn unwrap_chat_key(
    response: &KeyExchangeResponse,
    client_pair: &DhKeyPair,
) -> Result<(Vec<u8>, Vec<u8>), KeyExchangeError> {
    let server_public: BigUint = response
        .server_public
        .parse()
        .map_err(|_| KeyExchangeError::MalformedField("server_public"))?;

    let shared = client_pair.shared_secret(&server_public)?;
    let wrap_key = wrapping_key(&shared);

    let wrapped_key = hex::decode(&response.wrapped_chat_key)
        .map_err(|_| KeyExchangeError::MalformedField("wrapped_chat_key"))?;
    let wrapped_iv = hex::decode(&response.wrapped_chat_iv)
        .map_err(|_| KeyExchangeError::MalformedField("wrapped_chat_iv"))?;

    let suite = wrap_suite();
    let chat_key = suite.decrypt(&wrapped_key, &wrap_key, None)?;
    let chat_iv = suite.decrypt(&wrapped_iv, &wrap_key, None)?;
    Ok((chat_key, chat_iv))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// 128-bit primes keep the tests fast; the protocol is width-agnostic.
    fn test_engine() -> KeyExchangeEngine<MemoryStore> {
        KeyExchangeEngine::new(
            MemoryStore::new(),
            ExchangeConfig {
                prime_bits: 128,
                primality_rounds: 40,
            },
        )
    }

    fn client_pair_for(engine: &KeyExchangeEngine<MemoryStore>, room_id: &str) -> DhKeyPair {
        let handshake = engine.room_handshake(room_id).unwrap();
        let params = DhParameters::new(
            handshake.p.parse().unwrap(),
            handshake.g.parse().unwrap(),
        );
        DhKeyPair::generate(&params)
    }

    #[test]
    fn participant_recovers_room_chat_key() {
        let engine = test_engine();
        let client = client_pair_for(&engine, "room-1");

        let response = engine
            .initiate("room-1", "alice", &client.public().to_string())
            .unwrap();
        let (chat_key, chat_iv) = unwrap_chat_key(&response, &client).unwrap();

        let room = engine.established_parameters("room-1").unwrap();
        assert_eq!(chat_key, room.chat_key);
        assert_eq!(chat_iv, room.chat_iv);
        assert_eq!(chat_key.len(), CHAT_KEY_SIZE);
        assert_eq!(chat_iv.len(), CHAT_IV_SIZE);
    }

    #[test]
    fn second_participant_gets_same_chat_key_different_wrapping() {
        let engine = test_engine();
        let alice = client_pair_for(&engine, "room-1");
        let bob = client_pair_for(&engine, "room-1");

        let to_alice = engine
            .initiate("room-1", "alice", &alice.public().to_string())
            .unwrap();
        let to_bob = engine
            .initiate("room-1", "bob", &bob.public().to_string())
            .unwrap();

        // Same room key for both, but wrapped under different secrets.
        let (alice_key, alice_iv) = unwrap_chat_key(&to_alice, &alice).unwrap();
        let (bob_key, bob_iv) = unwrap_chat_key(&to_bob, &bob).unwrap();
        assert_eq!(alice_key, bob_key);
        assert_eq!(alice_iv, bob_iv);
        assert_ne!(to_alice.wrapped_chat_key, to_bob.wrapped_chat_key);
        assert_ne!(to_alice.server_public, to_bob.server_public);
    }

    #[test]
    fn rooms_get_distinct_parameters_and_keys() {
        let engine = test_engine();
        let one = client_pair_for(&engine, "room-1");
        let two = client_pair_for(&engine, "room-2");

        engine
            .initiate("room-1", "alice", &one.public().to_string())
            .unwrap();
        engine
            .initiate("room-2", "alice", &two.public().to_string())
            .unwrap();

        let room_one = engine.established_parameters("room-1").unwrap();
        let room_two = engine.established_parameters("room-2").unwrap();
        assert_ne!(room_one.p, room_two.p);
        assert_ne!(room_one.chat_key, room_two.chat_key);
    }

    #[test]
    fn participant_record_is_persisted() {
        let engine = test_engine();
        let client = client_pair_for(&engine, "room-1");

        engine
            .initiate("room-1", "alice", &client.public().to_string())
            .unwrap();

        let record = engine
            .store
            .participant_exchange("room-1", "alice")
            .unwrap()
            .unwrap();
        assert_eq!(&record.client_public, client.public());
        assert_eq!(record.wrapped_chat_key.len(), CHAT_KEY_SIZE);
        assert_eq!(record.wrapped_chat_iv.len(), CHAT_IV_SIZE);
    }

    #[test]
    fn malformed_public_key_is_rejected() {
        let engine = test_engine();
        assert!(matches!(
            engine.initiate("room-1", "alice", "not-a-number"),
            Err(KeyExchangeError::MalformedPublicKey)
        ));
    }

    #[test]
    fn degenerate_public_key_is_rejected() {
        let engine = test_engine();
        engine.room_handshake("room-1").unwrap();
        assert!(matches!(
            engine.initiate("room-1", "alice", "1"),
            Err(KeyExchangeError::Crypto(_))
        ));
    }

    #[test]
    fn unknown_room_lookup_fails_without_creating_it() {
        let engine = test_engine();
        assert!(matches!(
            engine.established_parameters("ghost"),
            Err(KeyExchangeError::RoomNotFound(room)) if room == "ghost"
        ));
        // The read-only path must not have established the room.
        assert!(matches!(
            engine.established_parameters("ghost"),
            Err(KeyExchangeError::RoomNotFound(_))
        ));
    }

    #[test]
    fn response_serializes_to_wire_friendly_json() {
        let engine = test_engine();
        let client = client_pair_for(&engine, "room-1");
        let response = engine
            .initiate("room-1", "alice", &client.public().to_string())
            .unwrap();

        let json = serde_json::to_string(&response).unwrap();
        let parsed: KeyExchangeResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server_public, response.server_public);

        // Decimal big integers, hex buffers.
        assert!(response.p.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(response.wrapped_chat_key.len(), 2 * CHAT_KEY_SIZE);
        assert_eq!(response.wrapped_chat_iv.len(), 2 * CHAT_IV_SIZE);
    }
}
