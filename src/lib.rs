pub mod assistant;
pub mod cli;
pub mod config;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod trace;

use anyhow::{Result, anyhow, bail};
use assistant::prompt::current_local_time;
use assistant::session::ChatSession;
use cli::{AppState, CliArgs, run_tui};
use config::AppConfig;
use http::client::HttpClient;
use http::debug::HttpDebugConfig;
use knowledge::KnowledgeBase;
use llm::anthropic::AnthropicProvider;
use llm::provider::LlmProvider;
use std::time::{SystemTime, UNIX_EPOCH};
use trace::{SessionTrace, TraceKind};

pub async fn run(args: CliArgs) -> Result<()> {
    let mut config = AppConfig::load_with_path(args.config.as_deref())?;
    config.apply_overrides(args.profile, args.knowledge_base.clone());

    let knowledge = KnowledgeBase::load(&config.knowledge_base);
    let chat = ChatSession::new(config.profile, knowledge);

    if args.print_system_prompt {
        print!("{}", chat.system_prompt(current_local_time()));
        return Ok(());
    }

    let session_id = generate_session_id();
    let trace = SessionTrace::create(&session_id)?;
    let http = HttpClient::new(
        reqwest::Client::new(),
        HttpDebugConfig::from_verbose(args.verbose),
    )
    .with_trace(trace.clone());
    let llm = AnthropicProvider::new(
        http,
        config.anthropic_api_key.clone(),
        config.base_url.clone(),
        config.model_settings(),
    );

    if let Some(question) = args.ask.as_deref() {
        if let Some(warning) = chat.knowledge().warning() {
            eprintln!("warning: {warning}");
        }
        let provider = llm.map_err(|err| {
            anyhow!(
                "Assistant unavailable: {err}. Configure it in your shell or .env file (example: ANTHROPIC_API_KEY=your_key)."
            )
        })?;
        let answer = ask_once(&provider, chat, &trace, question).await?;
        println!("{answer}");
        return Ok(());
    }

    let mut startup_messages = Vec::new();
    if let Some(warning) = chat.knowledge().warning() {
        startup_messages.push(warning);
    }

    let state = AppState {
        session_id,
        chat,
        llm: llm.ok(),
        theme_config: config.theme.clone(),
        startup_messages,
        trace,
    };

    run_tui(state).await
}

async fn ask_once<P: LlmProvider>(
    provider: &P,
    mut chat: ChatSession,
    trace: &SessionTrace,
    question: &str,
) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        bail!("--ask needs a non-empty question");
    }

    trace.record(TraceKind::ChatIn, question);
    let request = chat.prepare_turn(question, current_local_time());
    match provider.generate(request).await {
        Ok(response) => {
            trace.record(TraceKind::ChatOut, &response.text);
            Ok(response.text)
        }
        Err(err) => {
            let message = err.user_message();
            trace.record(TraceKind::ChatErr, &message);
            Err(anyhow!("{message}\n{}", err.hint()))
        }
    }
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
