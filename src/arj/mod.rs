// src/arj/mod.rs

pub mod builder;
pub mod interpreter;
pub mod params;
pub mod response;
