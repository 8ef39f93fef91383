#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod group;
pub mod set;
pub mod u64_set;
pub mod xxhash;

pub use error::Error;
pub use group::DefaultGroup;
pub use group::Group;
pub use set::SwissSet;
pub use set::DEFAULT_LOAD_FACTOR;
pub use u64_set::U64SwissSet;
