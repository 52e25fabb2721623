pub mod character;
pub mod generation;
pub mod page;
pub mod project;
pub mod reference_job;
