pub mod audit;
pub mod context;
pub mod outcome;
pub mod template;
pub mod validation;
