//! Raw elementary stream addressing and extraction

pub mod extract;
pub mod index;

pub use extract::{FrameBufferExtractor, FrameSegment};
pub use index::{FrameAddress, FrameAddressIndex};
