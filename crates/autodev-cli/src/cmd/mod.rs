pub mod code;
pub mod review;
pub mod serve;
