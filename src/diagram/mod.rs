//! The diagram: stage animators, selection and the scheduler loop that drives them.

pub mod controller;
pub mod driver;
