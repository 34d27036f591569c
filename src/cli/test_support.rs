//! Headless driver for the chat UI, used by the rendering tests.

use crate::assistant::conversation::ChatMessage;
use crate::assistant::profile::Profile;
use crate::assistant::session::ChatSession;
use crate::cli::app::{AppState, UiApp};
use crate::cli::render::Regions;
use crate::config::ThemeConfig;
use crate::http::client::HttpClient;
use crate::http::debug::HttpDebugConfig;
use crate::knowledge::KnowledgeBase;
use crate::llm::anthropic::{AnthropicProvider, ModelSettings};
use crate::trace::SessionTrace;
use anyhow::{Result, anyhow};
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const FIXTURE_KNOWLEDGE: &str = "CS 101 Syllabus\nMidterm: October 14, in class.\nFinal exam: December 12, 9:00 AM, Room 204.\nOffice hours: Tuesdays 2-4 PM.\nLate work: 10% off per day, up to 3 days.";

static TRACE_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStateView {
    pub input: String,
    pub profile: Profile,
    pub timeline_scroll: usize,
    pub show_sidebar: bool,
    pub waiting: bool,
    pub should_quit: bool,
    pub status: String,
}

pub struct UiHarness {
    terminal: Terminal<TestBackend>,
    app: UiApp,
}

impl UiHarness {
    pub fn new(width: u16, height: u16, state: AppState) -> Result<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        Ok(Self {
            terminal,
            app: UiApp::new(state, false),
        })
    }

    pub fn render(&mut self) -> Result<()> {
        let app = &mut self.app;
        self.terminal.draw(|frame| app.draw(frame))?;
        Ok(())
    }

    /// Handles the key, waits for any answer it triggered, then redraws.
    pub async fn send_key(&mut self, key: KeyEvent) -> Result<()> {
        self.app.handle_key(key);
        self.app.settle().await;
        self.render()
    }

    /// Handles the key and redraws without waiting for an in-flight answer.
    pub fn send_key_nowait(&mut self, key: KeyEvent) -> Result<()> {
        self.app.handle_key(key);
        self.render()
    }

    pub fn send_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        self.app.handle_mouse(mouse);
        self.render()
    }

    pub async fn settle(&mut self) -> Result<()> {
        self.app.settle().await;
        self.render()
    }

    pub fn seed_answered_turn(&mut self, prompt: &str, answer: &str) -> Result<()> {
        self.app.seed_answered_turn(prompt, answer);
        self.render()
    }

    pub fn buffer_lines(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn regions(&self) -> Result<Regions> {
        self.app
            .regions()
            .ok_or_else(|| anyhow!("ui has not been rendered yet"))
    }

    pub fn ui_state_view(&self) -> UiStateView {
        UiStateView {
            input: self.app.input().to_string(),
            profile: self.app.state().chat.profile(),
            timeline_scroll: self.app.timeline_scroll(),
            show_sidebar: self.app.sidebar_visible(),
            waiting: self.app.is_waiting(),
            should_quit: self.app.should_quit(),
            status: self.app.status_text(),
        }
    }

    pub fn conversation(&self) -> Vec<ChatMessage> {
        self.app.state().chat.conversation().messages().to_vec()
    }

    pub fn trace_path(&self) -> PathBuf {
        self.app.state().trace.file_path().to_path_buf()
    }
}

/// Builds an app state with a fixed knowledge base and a per-call trace directory.
///
/// With `base_url` set, the assistant talks to that endpoint using a dummy key;
/// without it the assistant is unavailable, as when no key is configured.
pub fn deterministic_app_state(session_id: &str, base_url: Option<&str>) -> Result<AppState> {
    let trace_dir = env::temp_dir().join("course-assistant-tests").join(format!(
        "{session_id}-{}-{}",
        std::process::id(),
        TRACE_DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let trace = SessionTrace::create_in_dir(session_id, &trace_dir)?;

    let llm = match base_url {
        Some(url) => Some(AnthropicProvider::new(
            HttpClient::new(reqwest::Client::new(), HttpDebugConfig::disabled())
                .with_trace(trace.clone()),
            Some("test-key".to_string()),
            url.to_string(),
            ModelSettings::default(),
        )?),
        None => None,
    };

    Ok(AppState {
        session_id: session_id.to_string(),
        chat: ChatSession::new(
            Profile::Logistics,
            KnowledgeBase::from_text("knowledge_base.txt", FIXTURE_KNOWLEDGE),
        ),
        llm,
        theme_config: ThemeConfig::default(),
        startup_messages: Vec::new(),
        trace,
    })
}
