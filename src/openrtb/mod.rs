// src/openrtb/mod.rs

pub mod builder;
pub mod interpreter;
pub mod request;
pub mod response;
