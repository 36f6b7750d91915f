//! End-to-end session key protocol flows, including the regression test
//! for racing first contacts on a brand-new room.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;

use chatlock_core::ExchangeConfig;
use chatlock_crypto::{Algorithm, CipherSuite, DhKeyPair, DhParameters, Mode, Padding};
use chatlock_keyserver::{KeyExchangeEngine, MemoryStore, unwrap_chat_key};

fn test_engine() -> KeyExchangeEngine<MemoryStore> {
    KeyExchangeEngine::new(
        MemoryStore::new(),
        ExchangeConfig {
            prime_bits: 128,
            primality_rounds: 40,
        },
    )
}

/// Run the full participant flow against an engine and return the
/// recovered chat key and IV.
fn join_room(engine: &KeyExchangeEngine<MemoryStore>, room: &str, user: &str) -> (Vec<u8>, Vec<u8>) {
    let handshake = engine.room_handshake(room).unwrap();
    let params = DhParameters::new(handshake.p.parse().unwrap(), handshake.g.parse().unwrap());
    let pair = DhKeyPair::generate(&params);

    let response = engine
        .initiate(room, user, &pair.public().to_string())
        .unwrap();
    unwrap_chat_key(&response, &pair).unwrap()
}

#[test]
fn recovered_chat_key_encrypts_room_traffic() {
    let engine = test_engine();

    let (alice_key, alice_iv) = join_room(&engine, "lobby", "alice");
    let (bob_key, bob_iv) = join_room(&engine, "lobby", "bob");
    assert_eq!(alice_key, bob_key);
    assert_eq!(alice_iv, bob_iv);

    // Alice encrypts a message with the room key; Bob reads it.
    let suite = CipherSuite::new(Algorithm::Rc6, Mode::Cbc, Padding::Pkcs7);
    let rc6_key = &alice_key[..16];
    let ciphertext = suite
        .encrypt(b"the meeting is at noon", rc6_key, Some(&alice_iv))
        .unwrap();
    let plaintext = suite
        .decrypt(&ciphertext, &bob_key[..16], Some(&bob_iv))
        .unwrap();
    assert_eq!(plaintext, b"the meeting is at noon");
}

#[test]
fn concurrent_first_contact_yields_one_chat_key() {
    // Regression test: room initialization is a check-then-act against
    // shared state. Without an atomic create-if-absent, two racing first
    // contacts could each persist their own parameters and hand out
    // different chat keys.
    let engine = Arc::new(test_engine());
    let participants = 8;

    let handles: Vec<_> = (0..participants)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || join_room(&engine, "fresh-room", &format!("user-{i}")))
        })
        .collect();

    let mut keys: Vec<(Vec<u8>, Vec<u8>)> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let (first_key, first_iv) = keys.pop().unwrap();
    for (key, iv) in keys {
        assert_eq!(key, first_key, "all participants must unwrap one chat key");
        assert_eq!(iv, first_iv);
    }

    // And the persisted room agrees with what everyone unwrapped.
    let room = engine.established_parameters("fresh-room").unwrap();
    assert_eq!(room.chat_key, first_key);
    assert_eq!(room.chat_iv, first_iv);
}

#[test]
fn default_suite_config_resolves_to_a_working_suite() {
    let config = chatlock_core::Config::default();
    let suite = CipherSuite::from_names(
        &config.suite.algorithm,
        &config.suite.mode,
        &config.suite.padding,
    )
    .unwrap();

    let key = [0x42u8; 16];
    let ct = suite.encrypt(b"configured traffic", &key, None).unwrap();
    assert_eq!(suite.decrypt(&ct, &key, None).unwrap(), b"configured traffic");
}

#[test]
fn wrapped_payloads_differ_from_plaintext_key_material() {
    let engine = test_engine();
    let handshake = engine.room_handshake("room-x").unwrap();
    let params = DhParameters::new(handshake.p.parse().unwrap(), handshake.g.parse().unwrap());
    let pair = DhKeyPair::generate(&params);

    let response = engine
        .initiate("room-x", "carol", &pair.public().to_string())
        .unwrap();
    let room = engine.established_parameters("room-x").unwrap();

    let wrapped_key = hex::decode(&response.wrapped_chat_key).unwrap();
    let wrapped_iv = hex::decode(&response.wrapped_chat_iv).unwrap();
    assert_ne!(wrapped_key, room.chat_key);
    assert_ne!(wrapped_iv, room.chat_iv);
}
