//! Test helper utilities
//!
//! Shared fixtures for asrkit-corpus integration tests

#![allow(dead_code)]

pub mod audio_generator;
pub mod corpus_builder;

pub use audio_generator::{generate_test_wav, AudioConfig};
pub use corpus_builder::{stm_line, write_exemplar, write_nested_exemplar};
