use crate::assistant::conversation::Role;
use crate::assistant::profile::Profile;
use crate::assistant::prompt::current_local_time;
use crate::assistant::session::ChatSession;
use crate::cli::commands::{Command, help_text, is_command_line, parse_command};
use crate::cli::render::{self, Regions};
use crate::cli::theme::Theme;
use crate::cli::timeline::{ChatTurnState, OutputKind, Timeline};
use crate::config::ThemeConfig;
use crate::llm::anthropic::AnthropicProvider;
use crate::llm::provider::{
    ChatResponse, LlmError, LlmProvider, LlmResult, TokenUsage,
};
use crate::trace::{SessionTrace, TraceKind};
use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::env;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::task::JoinHandle;

pub(crate) const UNAVAILABLE_MESSAGE: &str = "Assistant unavailable: missing ANTHROPIC_API_KEY. Configure it in your shell or .env file (example: ANTHROPIC_API_KEY=your_key).";
const BUSY_MESSAGE: &str = "Still waiting for the previous answer. Your input was kept.";
const MOUSE_SCROLL_LINES: usize = 3;
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct AppState {
    pub session_id: String,
    pub chat: ChatSession,
    pub llm: Option<AnthropicProvider>,
    pub theme_config: ThemeConfig,
    pub startup_messages: Vec<String>,
    pub trace: SessionTrace,
}

struct PendingTurn {
    timeline_index: usize,
    handle: JoinHandle<LlmResult<ChatResponse>>,
}

pub(crate) struct UiApp {
    state: AppState,
    theme: Theme,
    timeline: Timeline,
    input: String,
    history: Vec<String>,
    history_index: Option<usize>,
    history_draft: String,
    pending: Option<PendingTurn>,
    timeline_scroll: usize,
    max_scroll: usize,
    show_sidebar: bool,
    status_message: Option<String>,
    session_usage: TokenUsage,
    should_quit: bool,
    regions: Option<Regions>,
}

impl UiApp {
    pub(crate) fn new(state: AppState, color_enabled: bool) -> Self {
        let theme = Theme::from_config(color_enabled, &state.theme_config);
        state.trace.record(
            TraceKind::SysInfo,
            &format!(
                "session {} started (profile: {}, {})",
                state.session_id,
                state.chat.profile(),
                state.chat.knowledge().summary()
            ),
        );

        let mut timeline = Timeline::new();
        for message in &state.startup_messages {
            state.trace.record(TraceKind::SysErr, message);
            timeline.push_output(OutputKind::SystemHint, message);
        }

        Self {
            state,
            theme,
            timeline,
            input: String::new(),
            history: Vec::new(),
            history_index: None,
            history_draft: String::new(),
            pending: None,
            timeline_scroll: 0,
            max_scroll: 0,
            show_sidebar: true,
            status_message: None,
            session_usage: TokenUsage::default(),
            should_quit: false,
            regions: None,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn timeline_scroll(&self) -> usize {
        self.timeline_scroll
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn sidebar_visible(&self) -> bool {
        self.show_sidebar
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn regions(&self) -> Option<Regions> {
        self.regions
    }

    pub(crate) fn status_text(&self) -> String {
        let activity = match (&self.status_message, self.pending.is_some()) {
            (Some(message), _) => message.as_str(),
            (None, true) => "Thinking...",
            (None, false) => "Ready",
        };

        format!(
            "{} | Session: {} | Messages in conversation: {} | {activity}",
            self.state.chat.profile().title(),
            self.state.session_id,
            self.state.chat.conversation().len()
        )
    }

    pub(crate) fn draw(&mut self, frame: &mut Frame) {
        let regions = render::layout(frame.area(), self.show_sidebar);
        let profile = self.state.chat.profile();

        frame.render_widget(render::header(profile, &self.theme), regions.header);

        let view = render::timeline_view(
            self.timeline.render_lines(&self.theme),
            regions.timeline,
            self.timeline_scroll,
        );
        self.timeline_scroll = view.scroll;
        self.max_scroll = view.max_scroll;
        frame.render_widget(view.paragraph, regions.timeline);

        if let Some(area) = regions.sidebar {
            frame.render_widget(render::sidebar(profile.sidebar(), &self.theme), area);
        }

        let (input, cursor) = render::input(
            &self.input,
            profile.input_placeholder(),
            regions.input,
            &self.theme,
        );
        frame.render_widget(input, regions.input);
        frame.set_cursor_position(cursor);

        frame.render_widget(render::status(self.status_text(), &self.theme), regions.status);
        frame.render_widget(render::footer(profile, &self.theme), regions.footer);

        self.regions = Some(regions);
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => self.should_quit = true,
                KeyCode::Char('u') => {
                    self.input.clear();
                    self.history_index = None;
                }
                KeyCode::Char('b') => self.show_sidebar = !self.show_sidebar,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Char(ch) => {
                self.input.push(ch);
                self.history_index = None;
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.history_index = None;
            }
            KeyCode::Up => self.history_previous(),
            KeyCode::Down => self.history_next(),
            KeyCode::PageUp => self.scroll_by(self.page_size() as isize),
            KeyCode::PageDown => self.scroll_by(-(self.page_size() as isize)),
            _ => {}
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(regions) = self.regions else {
            return;
        };
        let area = regions.timeline;
        let inside = mouse.column >= area.x
            && mouse.column < area.x.saturating_add(area.width)
            && mouse.row >= area.y
            && mouse.row < area.y.saturating_add(area.height);
        if !inside {
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_by(MOUSE_SCROLL_LINES as isize),
            MouseEventKind::ScrollDown => self.scroll_by(-(MOUSE_SCROLL_LINES as isize)),
            _ => {}
        }
    }

    /// Applies the in-flight answer if it has arrived. Never blocks.
    pub(crate) async fn poll_pending(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished());
        if finished {
            self.settle().await;
        }
    }

    /// Waits for the in-flight answer, if any, and applies it.
    pub(crate) async fn settle(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let result = match pending.handle.await {
            Ok(result) => result,
            Err(err) => Err(LlmError::Transport(format!("request task failed: {err}"))),
        };
        self.finish_turn(pending.timeline_index, result);
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn seed_answered_turn(&mut self, prompt: &str, answer: &str) {
        self.state.chat.prepare_turn(prompt, current_local_time());
        self.state.chat.record_answer(answer);
        self.timeline
            .push_chat_turn(prompt.to_string(), ChatTurnState::Answered(answer.to_string()));
    }

    fn submit(&mut self) {
        let line = self.input.trim().to_string();
        if line.is_empty() {
            return;
        }

        let is_exit = line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit");
        if self.pending.is_some() && !is_exit && !is_command_line(&line) {
            self.status_message = Some(BUSY_MESSAGE.to_string());
            return;
        }

        self.input.clear();
        self.record_history(&line);
        self.timeline_scroll = 0;
        self.status_message = None;

        if is_exit {
            self.should_quit = true;
            return;
        }

        if is_command_line(&line) {
            self.state.trace.record(TraceKind::CmdIn, &line);
            self.timeline.push_user_input_command(&line);
            match parse_command(&line) {
                Ok(command) => self.run_command(command),
                Err(err) => self.emit(OutputKind::SystemError, &err.to_string()),
            }
            return;
        }

        self.ask(line);
    }

    fn ask(&mut self, question: String) {
        self.state.trace.record(TraceKind::ChatIn, &question);

        let Some(provider) = self.state.llm.clone() else {
            self.state.trace.record(TraceKind::ChatErr, UNAVAILABLE_MESSAGE);
            self.timeline.push_chat_turn(
                question,
                ChatTurnState::Failed {
                    message: UNAVAILABLE_MESSAGE.to_string(),
                    hint: None,
                },
            );
            return;
        };

        let request = self.state.chat.prepare_turn(&question, current_local_time());
        let timeline_index = self.timeline.push_chat_turn(question, ChatTurnState::InFlight);
        let handle = tokio::spawn(async move { provider.generate(request).await });
        self.pending = Some(PendingTurn {
            timeline_index,
            handle,
        });
    }

    fn finish_turn(&mut self, timeline_index: usize, result: LlmResult<ChatResponse>) {
        let (state, usage) = match result {
            Ok(response) => {
                self.state.chat.record_answer(&response.text);
                self.state.trace.record(TraceKind::ChatOut, &response.text);
                if let Some(usage) = response.usage {
                    self.session_usage.input_tokens += usage.input_tokens;
                    self.session_usage.output_tokens += usage.output_tokens;
                }
                (ChatTurnState::Answered(response.text), response.usage)
            }
            Err(err) => {
                let message = err.user_message();
                self.state.trace.record(TraceKind::ChatErr, &message);
                (
                    ChatTurnState::Failed {
                        message,
                        hint: Some(err.hint().to_string()),
                    },
                    None,
                )
            }
        };

        if let Some(turn) = self.timeline.chat_turn_mut(timeline_index) {
            turn.state = state;
            turn.usage = usage;
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::Help => self.emit(OutputKind::SystemInfo, &help_text()),
            Command::Clear => {
                if self.refuse_while_waiting() {
                    return;
                }
                self.state.chat.clear();
                self.timeline.clear();
                self.status_message = Some("Conversation cleared.".to_string());
                self.state.trace.record(TraceKind::CmdOut, "conversation cleared");
            }
            Command::History(limit) => {
                let conversation = self.state.chat.conversation();
                let messages = match limit {
                    Some(n) => conversation.recent(n),
                    None => conversation.messages(),
                };
                if messages.is_empty() {
                    self.emit(OutputKind::SystemInfo, "No messages in conversation.");
                    return;
                }
                let text = messages
                    .iter()
                    .map(|message| {
                        let speaker = match message.role {
                            Role::User => "you",
                            Role::Assistant => "assistant",
                        };
                        format!("{speaker}: {}", message.content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Stats => {
                let conversation = self.state.chat.conversation();
                let text = format!(
                    "Messages in conversation: {}\nConversations cleared: {}\nTokens (session): input {}, output {}, total {}",
                    conversation.len(),
                    conversation.cleared_count(),
                    self.session_usage.input_tokens,
                    self.session_usage.output_tokens,
                    self.session_usage.total()
                );
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Trace => {
                let text = format!("Trace file: {}", self.state.trace.file_path().display());
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Profile(None) => {
                let profile = self.state.chat.profile();
                let text = format!("profile: {profile} ({})", profile.title());
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Profile(Some(profile)) => self.switch_profile(profile),
            Command::KnowledgeBase => {
                let knowledge = self.state.chat.knowledge();
                let mut text = knowledge.summary();
                if let Some(warning) = knowledge.warning() {
                    text.push('\n');
                    text.push_str(&warning);
                }
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Sidebar(state) => {
                self.show_sidebar = state.unwrap_or(!self.show_sidebar);
                let text = format!("sidebar: {}", if self.show_sidebar { "on" } else { "off" });
                self.emit(OutputKind::SystemInfo, &text);
            }
            Command::Quit => self.should_quit = true,
        }
    }

    fn switch_profile(&mut self, profile: Profile) {
        if profile != self.state.chat.profile() && self.refuse_while_waiting() {
            return;
        }

        if self.state.chat.switch_profile(profile) {
            self.timeline.clear();
            self.status_message = Some(format!(
                "Switched to {profile} profile. Conversation cleared."
            ));
            self.state
                .trace
                .record(TraceKind::CmdOut, &format!("profile: {profile}"));
        } else {
            self.emit(
                OutputKind::SystemInfo,
                &format!("profile: {profile} (unchanged)"),
            );
        }
    }

    fn refuse_while_waiting(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.emit(
            OutputKind::SystemError,
            "Wait for the current answer before starting a new conversation.",
        );
        true
    }

    fn emit(&mut self, kind: OutputKind, text: &str) {
        self.state.trace.record(TraceKind::CmdOut, text);
        self.timeline.push_output(kind, text);
    }

    fn record_history(&mut self, line: &str) {
        if self.history.last().map(String::as_str) != Some(line) {
            self.history.push(line.to_string());
        }
        self.history_index = None;
        self.history_draft.clear();
    }

    fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let index = match self.history_index {
            None => {
                self.history_draft = self.input.clone();
                self.history.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };
        self.history_index = Some(index);
        self.input = self.history[index].clone();
    }

    fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };

        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.input = self.history[index + 1].clone();
        } else {
            self.history_index = None;
            self.input = std::mem::take(&mut self.history_draft);
        }
    }

    fn page_size(&self) -> usize {
        self.regions
            .map_or(1, |regions| usize::from(regions.timeline.height).saturating_sub(1))
            .max(1)
    }

    fn scroll_by(&mut self, delta: isize) {
        self.timeline_scroll = self
            .timeline_scroll
            .saturating_add_signed(delta)
            .min(self.max_scroll);
    }
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

pub async fn run_tui(state: AppState) -> Result<()> {
    let color_enabled = env::var_os("NO_COLOR").is_none();
    let mut app = UiApp::new(state, color_enabled);
    let mut guard = TerminalGuard::enter()?;

    loop {
        app.poll_pending().await;
        guard.terminal.draw(|frame| app.draw(frame))?;
        if app.should_quit() {
            break;
        }

        if event::poll(EVENT_POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    if let Some(pending) = app.pending.take() {
        pending.handle.abort();
    }

    Ok(())
}
