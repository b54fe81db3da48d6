//! Core operations and types of the Canopy standard merkle tree.
//!
//! This crate defines the tree schema and the algorithms over it in a
//! caller-agnostic manner: flat-array construction over pre-hashed leaves,
//! single-leaf proof extraction, compacted multiproofs, and the stateless
//! verification routines for both.
//!
//! The types and verification routines of this crate do not require the
//! standard library, but do require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod hasher;
pub mod multi_proof;
pub mod proof;
pub mod tree;
