pub mod clock;
pub mod cycle;
pub mod machine;
