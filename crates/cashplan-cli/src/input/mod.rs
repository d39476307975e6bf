pub mod file;
pub mod prompt;
pub mod stdin;
pub mod values;
