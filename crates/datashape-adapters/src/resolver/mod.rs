//! Service resolver adapters.

mod container;

pub use container::ContainerResolver;
