#![allow(dead_code)]
extern crate ndarray;

pub mod data;
pub mod error;
pub mod families;
pub mod mining;
pub mod rng;
pub mod serialization;
pub mod table;

pub use data::{ListDB, SparseList, SparseVector, VectorDB};
pub use error::{Error, Result};
pub use families::{HashFamily, L1Family, LpFamily, StableDistribution};
pub use mining::{l1_mine, lp_mine};
pub use rng::Rng;
pub use table::HashTable;
