#![allow(dead_code)]

pub mod backend;
pub mod depdash_env;
