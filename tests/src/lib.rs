//! # Quantum-Mint Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── admission_benchmarks.rs  # Criterion: single and bulk admission
//! └── src/integration/
//!     ├── scenarios.rs     # Reference scenarios A-E
//!     ├── concurrency.rs   # Serializability under contention
//!     ├── randomized.rs    # Random request streams, invariants after every step
//!     └── wiring.rs        # TOML config, telemetry, event bus end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qm-tests
//!
//! # By category
//! cargo test -p qm-tests integration::scenarios::
//! cargo test -p qm-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p qm-tests
//! ```

#![allow(dead_code)]

pub mod integration;
