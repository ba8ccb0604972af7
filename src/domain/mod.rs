// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types that describe the language-modelling data
// before any framework touches it.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything here can be unit tested without a GPU.

// Word <-> id mapping shared by all corpus splits
pub mod vocabulary;

// Flat and batched token id sequences
pub mod sequence;

// Corpus splits and the loaded corpus bundle
pub mod corpus;

// Recurrent layer selection
pub mod rnn_mode;

// Core abstractions (traits) that other layers implement
pub mod traits;
