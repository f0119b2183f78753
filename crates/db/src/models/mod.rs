pub mod assignment;
pub mod lawyer;
pub mod quota;
pub mod review;
pub mod task;
pub mod workload;
