//! In-memory collaborators for exercising the reconciler without a mesh
//! control plane.

pub mod builders;
mod fake_converter;
mod fake_store;

pub use fake_converter::FakeConverter;
pub use fake_store::FakeStore;
