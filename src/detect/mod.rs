mod backend;
mod backends;
pub mod labels;
mod result;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
pub use result::{BinaryMask, Detection, SoftMask};

#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
