use crate::assistant::profile::Profile;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "course-assistant")]
#[command(
    about = "Terminal chat assistant that answers course questions from a knowledge base",
    long_about = "Terminal chat assistant that answers course questions from a knowledge base\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/course-assistant/config.toml\n    2. ~/.config/course-assistant/config.toml"
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Assistant behaviour: `logistics` or `teaching`.
    #[arg(long, value_name = "NAME", value_parser = parse_profile)]
    pub profile: Option<Profile>,

    /// Course information file spliced into the system prompt.
    #[arg(long, value_name = "PATH")]
    pub knowledge_base: Option<PathBuf>,

    /// Ask a single question, print the answer and exit.
    #[arg(long, value_name = "QUESTION", conflicts_with = "print_system_prompt")]
    pub ask: Option<String>,

    /// Print the system prompt that would be sent and exit.
    #[arg(long)]
    pub print_system_prompt: bool,

    /// Log HTTP traffic to stderr (secrets redacted).
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_profile(value: &str) -> Result<Profile, String> {
    value.parse()
}
