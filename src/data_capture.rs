pub mod capture_loop;
pub mod codec;
pub mod emitter;
pub mod reducer;
pub mod types;


pub use capture_loop::{CaptureLoop, CaptureState, CaptureSummary};
pub use emitter::TraceEmitter;
pub use reducer::reduce;
pub use types::{Payload, RawChunk, ReadOutcome, TraceLine};
