//! Integration tests for Layer 1: Transfer
//!
//! Tests for the serializer protocol, field transfer, and the document backend.

mod documents;
mod fields;
