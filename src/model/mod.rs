// src/model/mod.rs

pub mod bid;
pub mod context;
pub mod descriptor;
pub mod slot;
