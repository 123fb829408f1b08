//! 领域实体

pub mod flag;
pub mod plan;
pub mod profile;

pub use flag::Flag;
pub use plan::{LaunchPlan, OutputFormat};
pub use profile::{
    DEFAULT_INTERPRETER, DEFAULT_PROFILE, DEFAULT_SCRIPT, Profile, Section, validate_env_key,
};
