pub mod check;
pub mod explain;
pub mod get;
pub mod show;
