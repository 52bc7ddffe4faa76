#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod cli;
pub mod core;
mod prelude;
pub mod quantity;
pub mod tables;
