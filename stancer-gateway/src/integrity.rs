//! The `unique_id` token that binds a provider return to the checkout that
//! produced it.
//!
//! Each input is digested with SHA-512 (lowercase hex), the five digests are
//! concatenated in a fixed order, and the concatenation is digested again with
//! MD5. Both the initiator and the verifier go through [`derive_unique_id`],
//! and tokens minted before a deploy are verified after it, so the chain must
//! stay byte-for-byte identical.

use md5::Md5;
use sha2::{Digest, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;

use common_money::MinorUnits;

#[derive(Debug, Clone, Copy)]
pub struct IntegrityInput<'a> {
    pub system_url: &'a str,
    pub unique_time: &'a str,
    pub order_id: &'a str,
    pub amount: MinorUnits,
    pub secret_key: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueId(String);

impl UniqueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a token received from the outside.
    pub fn matches(&self, received: &str) -> bool {
        self.0.as_bytes().ct_eq(received.as_bytes()).into()
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sha512_hex(value: &str) -> String {
    hex::encode(Sha512::digest(value.as_bytes()))
}

pub fn derive_unique_id(input: &IntegrityInput<'_>) -> UniqueId {
    let amount = input.amount.to_string();
    let chained: String = [
        input.system_url,
        input.unique_time,
        input.order_id,
        amount.as_str(),
        input.secret_key,
    ]
    .iter()
    .map(|segment| sha512_hex(segment))
    .collect();
    UniqueId(hex::encode(Md5::digest(chained.as_bytes())))
}

pub fn verify_unique_id(input: &IntegrityInput<'_>, received: &str) -> bool {
    derive_unique_id(input).matches(received)
}
