//! # agentcore-cli
//!
//! Thin front end over the `memory` crate: the agent turn loop, a pluggable response
//! generator, the seed loader and the clap command definitions. `main.rs` only wires these
//! together with config from env.

pub mod agent;
pub mod cli;
pub mod logger;
pub mod responder;
pub mod seed;

pub use agent::{Agent, AgentProfile, PromptContext, KNIGHT_GREETING, RECALL_K, RECENT_TURNS};
pub use cli::{Cli, Commands};
pub use logger::init_tracing;
pub use responder::{ResponseGenerator, TemplateResponder};
pub use seed::{load_seed_file, parse_seed, SeedMemory};
