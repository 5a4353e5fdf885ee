pub mod hospitals_handler;
pub mod problem;
