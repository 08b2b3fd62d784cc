use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature, SigningKey, Verifier};
use minter_near::{generate_auth_token, InMemoryKeyStore, InMemorySigner, KeyPair};
use proptest::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::Arc;

fn signer(account_id: &str, seed: [u8; 32]) -> (InMemorySigner, KeyPair) {
    let pair = KeyPair::new(SigningKey::from_bytes(&seed));
    let mut store = InMemoryKeyStore::new();
    store.set_key("testnet", account_id, pair.clone());
    (InMemorySigner::new(Arc::new(store)), pair)
}

#[tokio::test]
async fn test_token_payload_is_account_pubkey_signature() {
    let (signer, pair) = signer("projectp.testnet", [11u8; 32]);
    let token = generate_auth_token("projectp.testnet", &signer, "testnet")
        .await
        .unwrap();

    let decoded = String::from_utf8(STANDARD.decode(token.as_str()).unwrap()).unwrap();
    let fields: Vec<&str> = decoded.split('&').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0], "projectp.testnet");
    assert_eq!(fields[1], hex::encode(pair.public_key().as_bytes()));

    let sig_bytes: [u8; 64] = hex::decode(fields[2]).unwrap().try_into().unwrap();
    let digest = Sha256::digest(b"projectp.testnet");
    assert!(pair
        .verifying_key()
        .verify(&digest, &Signature::from_bytes(&sig_bytes))
        .is_ok());
}

#[tokio::test]
async fn test_token_is_deterministic_for_same_key() {
    let (signer, _) = signer("projectp.testnet", [12u8; 32]);
    let a = generate_auth_token("projectp.testnet", &signer, "testnet").await.unwrap();
    let b = generate_auth_token("projectp.testnet", &signer, "testnet").await.unwrap();
    // ed25519 signatures are deterministic
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn prop_token_round_trips_account_id(account in "[a-z0-9_-]{2,20}\\.testnet", seed in any::<[u8; 32]>()) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (signer, _) = signer(&account, seed);
        let token = rt.block_on(generate_auth_token(&account, &signer, "testnet")).unwrap();
        let parts = token.decode().unwrap();
        prop_assert_eq!(parts.account_id, account);
        prop_assert_eq!(parts.public_key_hex.len(), 64);
        prop_assert_eq!(parts.signature_hex.len(), 128);
    }
}
