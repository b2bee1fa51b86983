//! CLI domain: parse, route, and output only.
//! Object semantics live in the library; the route table maps commands onto them.

mod output;
mod parse;
mod route;

pub use output::{map_error, render_value};
pub use parse::{Cli, Commands};
pub use route::RunContext;
