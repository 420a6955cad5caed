//! Cryptography keyword classification
//!
//! A cheap textual pre-filter: a file matches a category when any of the
//! category's patterns occurs anywhere in its content, case-insensitively.

use crate::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Category name and its patterns, in reporting order
pub const CRYPTO_PATTERNS: &[(&str, &[&str])] = &[
    ("aes", &[r"\baes\b", r"aes-?\d+", r"AESKey", r"AES\.encrypt", r"AES\.decrypt"]),
    ("rsa", &[r"\brsa\b", r"rsa-?\d+", r"RSAPublicKey", r"RSAPrivateKey", r"RSAKey"]),
    ("signing", &[r"sign(ing)?", r"verify(ing)?", r"signature", r"digital[_ ]signature"]),
    ("cert", &[r"certificate", r"x\.509", r"public[_ ]?key", r"private[_ ]?key", r"pem", r"der"]),
    ("hash", &[r"sha-?\d+", r"hash", r"pbkdf2", r"scrypt", r"bcrypt", r"HMAC"]),
    ("keys", &[r"api[_ ]?key", r"secret", r"token"]),
];

pub struct CryptoMatcher {
    categories: Vec<(&'static str, Vec<Regex>)>,
}

impl CryptoMatcher {
    pub fn new() -> Result<Self> {
        let mut categories = Vec::with_capacity(CRYPTO_PATTERNS.len());
        for (category, patterns) in CRYPTO_PATTERNS {
            let compiled = patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| Error::Config(format!("invalid pattern {:?}: {}", p, e)))
                })
                .collect::<Result<Vec<_>>>()?;
            categories.push((*category, compiled));
        }
        Ok(Self { categories })
    }

    /// Categories with at least one matching pattern, each listed once
    pub fn categories(&self, content: &str) -> Vec<&'static str> {
        self.categories
            .iter()
            .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(content)))
            .map(|(category, _)| *category)
            .collect()
    }
}
