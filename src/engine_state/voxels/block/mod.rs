//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions and block face handling.

pub mod block_side;
pub mod block_type;

pub use block_side::BlockSide;
pub use block_type::BlockType;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;
