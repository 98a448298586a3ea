pub mod list;
pub mod operations;
pub mod plan;
pub mod run;
pub mod vm;
