//! Explanation requests: prompt, parsing, outcome publication and panel view.

pub mod display;
pub mod flow;
pub mod parser;
pub mod prompt;
