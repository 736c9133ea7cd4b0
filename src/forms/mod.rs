pub mod catalog;
pub mod lists;
pub mod submissions;
