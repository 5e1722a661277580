//! Invite code generation.

use platepick_protocol::InviteCode;
use rand::Rng;

/// Characters an invite code is drawn from.
pub const INVITE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every invite code.
pub const INVITE_CODE_LENGTH: usize = 6;

/// Produces short, uppercase, shareable room codes.
///
/// Codes are uniform over [`INVITE_ALPHABET`]; with 36^6 possibilities a
/// collision is rare but possible, so callers check against the live set
/// with [`ensure_unique`](Self::ensure_unique).
#[derive(Debug, Default, Clone, Copy)]
pub struct InviteCodeGenerator;

impl InviteCodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// A fresh random code. Not checked against anything.
    pub fn generate(&self) -> InviteCode {
        let mut rng = rand::rng();
        let code: String = (0..INVITE_CODE_LENGTH)
            .map(|_| INVITE_ALPHABET[rng.random_range(0..INVITE_ALPHABET.len())] as char)
            .collect();
        InviteCode::from(code)
    }

    /// Generates codes until `exists` reports one as free.
    ///
    /// There is no retry limit; each collision is logged.
    pub fn ensure_unique(&self, mut exists: impl FnMut(&str) -> bool) -> InviteCode {
        loop {
            let code = self.generate();
            if !exists(code.as_str()) {
                return code;
            }
            tracing::warn!(invite_code = %code, "invite code collision, regenerating");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_code_shape() {
        let generator = InviteCodeGenerator::new();
        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), INVITE_CODE_LENGTH);
            assert!(code.as_str().bytes().all(|b| INVITE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_ensure_unique_retries_past_collisions() {
        let generator = InviteCodeGenerator::new();
        let mut calls = 0;
        let code = generator.ensure_unique(|_| {
            calls += 1;
            calls <= 3
        });
        assert_eq!(calls, 4);
        assert_eq!(code.as_str().len(), INVITE_CODE_LENGTH);
    }

    #[test]
    fn test_ensure_unique_avoids_taken_codes() {
        let generator = InviteCodeGenerator::new();
        let mut taken = HashSet::new();
        for _ in 0..500 {
            let code = generator.ensure_unique(|c| taken.contains(c));
            assert!(taken.insert(code.as_str().to_string()));
        }
    }
}
