pub mod gait;
pub mod trace;
