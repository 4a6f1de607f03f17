//! Core traits for compute backends

mod client;
mod device;
mod runtime;

pub use client::RuntimeClient;
pub use device::Device;
pub use runtime::Runtime;
