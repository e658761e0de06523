// Application layer: wires config, adapters and core services into CLI commands.

pub mod commands;

pub use commands::run;
