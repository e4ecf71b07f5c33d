mod process;
mod stub;

pub use process::ProcessBackend;
pub use stub::StubBackend;
