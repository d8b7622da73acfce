#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs, missing_debug_implementations)]
extern crate alloc;
mod deep_clone;
mod error;
mod pool_allocator;
mod reuse_pool;
mod ring_buffer;

pub use deep_clone::*;
pub use error::*;
pub use pool_allocator::*;
pub use reuse_pool::*;
pub use ring_buffer::*;
