pub mod errors;
pub mod perceptor;
pub mod report;
