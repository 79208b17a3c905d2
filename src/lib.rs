#[macro_use]
extern crate log;

pub mod catalog;
pub mod recommender;
