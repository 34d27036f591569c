use anyhow::Result;
use clap::Parser;
use course_assistant::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    course_assistant::run(args).await
}
