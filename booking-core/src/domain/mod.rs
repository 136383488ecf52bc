pub mod analytics;
pub mod catalog;
pub mod draft;
pub mod flow;
pub mod negotiator;
pub mod slots;
pub mod steps;
pub mod submission;
pub mod weekly_grid;
