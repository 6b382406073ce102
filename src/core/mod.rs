//! # Core Module
//!
//! Small shared primitives used across the engine.
//!
//! ## Key Components
//! - `MtResource`: thread-safe reference-counted resource with read-write locking
//! - `timing`: wall-clock measurement of operations that may run long
//!
//! ## Usage
//! ```
//! use crafter::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;
pub mod timing;

pub use mt_resource::MtResource;
