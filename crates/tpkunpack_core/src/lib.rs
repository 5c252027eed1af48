//! Public library API for unpacking `.tpk` sprite containers.

/// Container parsing, frame reconstruction, and animation assembly.
pub mod tpk;
