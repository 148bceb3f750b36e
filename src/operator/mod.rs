//! Quantum gate library.
//!
//! Gates are small tagged values rather than a class hierarchy: each atomic
//! operation carries its parameters and yields the 2x2 unitary it applies to
//! an amplitude pair. The register consumes every single-qubit gate through
//! the same pair kernel, so adding a gate means adding one file here and one
//! method on the register.

pub(crate) mod atomic;
