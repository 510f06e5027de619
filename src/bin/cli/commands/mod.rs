pub mod add;
pub mod due;
pub mod list;
pub mod review;
pub mod stats;
