use crate::cli::theme::Theme;
use crate::config::ThemeToken;
use crate::llm::provider::TokenUsage;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

pub(crate) const USER_PROMPT: &str = "you> ";
const COMMAND_PROMPT: &str = "cmd> ";
const INDENT: &str = "  ";
const WELCOME: &str =
    "Welcome! Ask a question below. Type /help for commands, Ctrl-B toggles the sidebar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputKind {
    SystemInfo,
    SystemError,
    SystemHint,
}

impl OutputKind {
    fn token(self) -> ThemeToken {
        match self {
            Self::SystemInfo => ThemeToken::SystemInfo,
            Self::SystemError => ThemeToken::SystemError,
            Self::SystemHint => ThemeToken::SystemHint,
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Command(String),
    Output { kind: OutputKind, text: String },
    Turn(ChatTurn),
}

/// A question and whatever has come back for it so far.
#[derive(Debug, Clone)]
pub(crate) struct ChatTurn {
    pub(crate) prompt: String,
    pub(crate) state: ChatTurnState,
    pub(crate) usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatTurnState {
    InFlight,
    Answered(String),
    Failed {
        message: String,
        hint: Option<String>,
    },
}

/// Scrollback of the session. Rendering is unwrapped; the renderer wraps.
#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    entries: Vec<Entry>,
}

impl Timeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_output(&mut self, kind: OutputKind, text: &str) {
        self.entries.extend(text.lines().map(|line| Entry::Output {
            kind,
            text: line.to_owned(),
        }));
    }

    pub(crate) fn push_user_input_command(&mut self, text: &str) {
        self.entries
            .extend(text.lines().map(|line| Entry::Command(line.to_owned())));
    }

    /// Returns the index to pass to [`Timeline::chat_turn_mut`] once the answer arrives.
    pub(crate) fn push_chat_turn(&mut self, prompt: String, state: ChatTurnState) -> usize {
        self.entries.push(Entry::Turn(ChatTurn {
            prompt,
            state,
            usage: None,
        }));
        self.entries.len() - 1
    }

    pub(crate) fn chat_turn_mut(&mut self, index: usize) -> Option<&mut ChatTurn> {
        match self.entries.get_mut(index)? {
            Entry::Turn(turn) => Some(turn),
            _ => None,
        }
    }

    pub(crate) fn render_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        if self.entries.is_empty() {
            return vec![plain(WELCOME, theme.style(ThemeToken::SystemInfo))];
        }

        let mut out = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Command(text) => out.push(prompted(COMMAND_PROMPT, text, theme)),
                Entry::Output { kind, text } => out.push(plain(text, theme.style(kind.token()))),
                Entry::Turn(turn) => turn.render(theme, &mut out),
            }
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ChatTurn {
    fn render(&self, theme: &Theme, out: &mut Vec<Line<'static>>) {
        let mut prompt = self.prompt.lines();
        out.push(prompted(USER_PROMPT, prompt.next().unwrap_or_default(), theme));
        let hanging = " ".repeat(USER_PROMPT.len());
        out.extend(prompt.map(|line| {
            plain(
                &format!("{hanging}{line}"),
                theme.style(ThemeToken::UserInput),
            )
        }));

        let block = |out: &mut Vec<Line<'static>>, text: &str, token: ThemeToken| {
            out.extend(text.lines().map(|line| plain(line, theme.style(token))));
        };
        match &self.state {
            ChatTurnState::InFlight => out.push(plain(
                &format!("{INDENT}Thinking..."),
                theme.style(ThemeToken::AssistantWaiting),
            )),
            ChatTurnState::Answered(answer) => {
                block(out, answer, ThemeToken::AssistantText);
                if let Some(usage) = self.usage.filter(|usage| !usage.is_zero()) {
                    out.push(plain(
                        &format!("{INDENT}Tokens (turn): {}", usage.total()),
                        theme.style(ThemeToken::SystemInfo),
                    ));
                }
            }
            ChatTurnState::Failed { message, hint } => {
                block(out, message, ThemeToken::SystemError);
                if let Some(hint) = hint {
                    block(out, hint, ThemeToken::SystemHint);
                }
            }
        }
    }
}

fn plain(text: &str, style: Style) -> Line<'static> {
    Line::from(Span::styled(text.to_owned(), style))
}

fn prompted(prompt: &'static str, text: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(prompt, theme.style(ThemeToken::UserPrompt)),
        Span::styled(text.to_owned(), theme.style(ThemeToken::UserInput)),
    ])
}
