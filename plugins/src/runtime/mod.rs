mod host;
mod packaged;

pub use host::HostRuntime;
pub use packaged::PackagedRuntime;
