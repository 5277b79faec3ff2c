// apps/pg_cli/src/commands/mod.rs

//! CLI 子命令

pub mod info;
pub mod run;
pub mod validate;
