use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::PkcePair;

/// Length of a generated verifier; the RFC 7636 maximum.
pub const CODE_VERIFIER_LEN: usize = 128;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_VERIFIER_LEN)
        .map(char::from)
        .collect()
}

/// `S256` challenge: unpadded URL-safe base64 of the verifier's SHA-256.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_pkce_pair() -> PkcePair {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);
    PkcePair {
        code_verifier,
        code_challenge,
    }
}
