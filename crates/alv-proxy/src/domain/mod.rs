//! # Domain Layer for the Verification Proxy
//!
//! Pure state with no I/O dependencies. This is the innermost layer of the
//! hexagonal architecture.
//!
//! ## Contents
//!
//! - **entities**: Core domain entities (`VerificationToken`,
//!   `PendingVerification`, `AllocatedRequest`)
//! - **pending**: The pending-request index (`PendingRequestIndex`), single
//!   lock over token allocation and the token → request map
//! - **token**: Monotonic token allocation (`TokenAllocator`)
//! - **value_objects**: Configuration (`ProxyConfig`) and host-string joining
//!
//! ## Design Principles
//!
//! 1. **No I/O**: nothing here sends, schedules, or touches the store
//! 2. **Single-Lock Discipline**: all index mutation is serialized through
//!    one mutex, and the lock never wraps an outbound call

mod entities;
mod pending;
mod token;
mod value_objects;

pub use entities::*;
pub use pending::*;
pub use token::*;
pub use value_objects::*;
