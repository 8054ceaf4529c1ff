pub mod buffer;
pub mod sample;
pub mod source;

pub use buffer::SampleTail;
pub use sample::Sample;
pub use source::WavFileSource;
