//! Visible-mode output: pixel frames and recorded videos

pub mod frame;
pub mod recorder;

pub use frame::FrameBuffer;
pub use recorder::VideoRecorder;
