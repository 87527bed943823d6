// Company domain module
// The company is the aggregate root every other record belongs to

#![allow(clippy::module_inception)]

pub mod company;
pub mod value_objects;

pub use company::{Company, CompanyChanges, NewCompany};
pub use value_objects::{CompanySize, Nip, Regon};
