//! # CreatorLedger Testkit
//!
//! Testing utilities for CreatorLedger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **RFC 8032 vectors**: the published Ed25519 test vectors, checked
//!   bit-for-bit against this implementation
//! - **Generators**: proptest strategies for property-based testing
//! - **Fixtures**: helper structs for setting up test scenarios
//!
//! ## RFC 8032 Vectors
//!
//! ```rust
//! use creatorledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed) in verify_all_vectors() {
//!     assert!(passed, "{name} failed");
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use creatorledger_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let chain = fixture.make_chain(3);
//! assert_eq!(chain.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_creator_fixtures, TestFixture};
pub use generators::{event_from_params, EventParams};
pub use vectors::{all_vectors, check_vector, verify_all_vectors, Rfc8032Vector};
