//! Monotonic token allocation.

use super::VerificationToken;

/// Allocates correlation tokens for outbound verification requests.
///
/// The allocator is owned by the pending-request index and its `next` is only
/// called while the index lock is held, so allocation and insertion are one
/// atomic step and a freshly allocated token can never collide with a token
/// still present in the index.
///
/// The counter only increases and is never reset for the lifetime of the
/// proxy instance. Overflow of the u64 counter is an unchecked edge case:
/// it would require 2^64 allocations within one process lifetime.
#[derive(Debug)]
pub struct TokenAllocator {
    next: u64,
}

impl TokenAllocator {
    /// First token value handed out.
    pub const FIRST_TOKEN: u64 = 1;

    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Self::FIRST_TOKEN,
        }
    }

    /// Allocate the next token. Caller must hold the index lock.
    pub fn next(&mut self) -> VerificationToken {
        let token = VerificationToken(self.next);
        self.next += 1;
        token
    }
}

impl Default for TokenAllocator {
    fn default() -> Self {
        Self::new()
    }
}
