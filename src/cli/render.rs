use crate::assistant::profile::{Profile, Sidebar, SidebarItemKind};
use crate::cli::theme::Theme;
use crate::cli::timeline::USER_PROMPT;
use crate::config::ThemeToken;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

const HEADER_HEIGHT: u16 = 2;
const INPUT_HEIGHT: u16 = 3;
const SIDEBAR_WIDTH: u16 = 36;
const MIN_TIMELINE_WIDTH: u16 = 40;

/// Screen areas of the chat UI, recomputed on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub header: Rect,
    pub timeline: Rect,
    pub sidebar: Option<Rect>,
    pub input: Rect,
    pub status: Rect,
    pub footer: Rect,
}

pub(crate) fn layout(area: Rect, show_sidebar: bool) -> Regions {
    let [header, body, input, status, footer] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    // Narrow terminals drop the sidebar rather than squeezing the timeline.
    let (timeline, sidebar) = if show_sidebar && body.width >= SIDEBAR_WIDTH + MIN_TIMELINE_WIDTH
    {
        let [timeline, sidebar] = Layout::horizontal([
            Constraint::Min(MIN_TIMELINE_WIDTH),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .areas(body);
        (timeline, Some(sidebar))
    } else {
        (body, None)
    };

    Regions {
        header,
        timeline,
        sidebar,
        input,
        status,
        footer,
    }
}

pub(crate) fn header(profile: Profile, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(profile.title(), theme.style(ThemeToken::Title))),
        Line::from(Span::styled(
            profile.tagline(),
            theme.style(ThemeToken::Tagline),
        )),
    ])
}

pub(crate) struct TimelineView {
    pub(crate) paragraph: Paragraph<'static>,
    pub(crate) scroll: usize,
    pub(crate) max_scroll: usize,
}

/// `scroll` counts rows up from the newest line; it is clamped to the content.
pub(crate) fn timeline_view(lines: Vec<Line<'static>>, area: Rect, scroll: usize) -> TimelineView {
    let width = usize::from(area.width);
    let height = usize::from(area.height);
    let rows = lines
        .iter()
        .flat_map(|line| wrap_line(line, width))
        .collect::<Vec<_>>();

    let max_scroll = rows.len().saturating_sub(height);
    let scroll = scroll.min(max_scroll);
    let end = rows.len() - scroll;
    let start = end.saturating_sub(height);
    let visible = rows[start..end].to_vec();

    TimelineView {
        paragraph: Paragraph::new(visible),
        scroll,
        max_scroll,
    }
}

pub(crate) fn sidebar(sidebar: &Sidebar, theme: &Theme) -> Paragraph<'static> {
    let mut lines = Vec::new();
    for section in sidebar.sections {
        if let Some(title) = section.title {
            lines.push(Line::from(Span::styled(
                title,
                theme.style(ThemeToken::SidebarHeading),
            )));
        }
        let (marker, token) = match section.kind {
            SidebarItemKind::Allowed => ("✓ ", ThemeToken::SidebarAllowed),
            SidebarItemKind::Denied => ("✗ ", ThemeToken::SidebarDenied),
            SidebarItemKind::Plain => ("• ", ThemeToken::AssistantText),
        };
        for item in section.items {
            lines.push(Line::from(vec![
                Span::styled(marker, theme.style(token)),
                Span::styled(*item, theme.style(ThemeToken::AssistantText)),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        sidebar.note,
        theme.style(ThemeToken::Tagline),
    )));

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(theme.style(ThemeToken::Status))
                .padding(Padding::horizontal(1))
                .title(Span::styled(
                    sidebar.heading,
                    theme.style(ThemeToken::SidebarHeading),
                )),
        )
}

/// Returns the input widget and the terminal cursor position inside `area`.
pub(crate) fn input(
    text: &str,
    placeholder: &str,
    area: Rect,
    theme: &Theme,
) -> (Paragraph<'static>, (u16, u16)) {
    let prompt_width = USER_PROMPT.chars().count();
    let available = usize::from(area.width).saturating_sub(prompt_width + 1);

    let content = if text.is_empty() {
        Span::styled(placeholder.to_string(), theme.style(ThemeToken::Placeholder))
    } else {
        // Keep the tail visible while typing past the edge.
        let chars = text.chars().count();
        let visible = text
            .chars()
            .skip(chars.saturating_sub(available))
            .collect::<String>();
        Span::styled(visible, theme.style(ThemeToken::UserInput))
    };
    let typed = if text.is_empty() {
        0
    } else {
        text.chars().count().min(available)
    };

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(USER_PROMPT, theme.style(ThemeToken::UserPrompt)),
        content,
    ]))
    .block(
        Block::default()
            .style(theme.style(ThemeToken::InputBlock))
            .padding(Padding::vertical(1)),
    );

    let cursor_x = area.x.saturating_add(u16::try_from(prompt_width + typed).unwrap_or(u16::MAX));
    let cursor_y = area.y.saturating_add(INPUT_HEIGHT / 2);
    (paragraph, (cursor_x, cursor_y))
}

pub(crate) fn status(text: String, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(text, theme.style(ThemeToken::Status))))
}

pub(crate) fn footer(profile: Profile, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        profile.footer(),
        theme.style(ThemeToken::Footer),
    )))
}

/// Greedy word wrap that keeps span styles; words longer than `width` are split.
pub(crate) fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let cells = line
        .spans
        .iter()
        .flat_map(|span| {
            let style = line.style.patch(span.style);
            span.content.chars().map(move |ch| (ch, style))
        })
        .collect::<Vec<_>>();

    if width == 0 || cells.len() <= width {
        return vec![line.clone()];
    }

    let mut rows = Vec::new();
    let mut start = 0;
    while start < cells.len() {
        let end = (start + width).min(cells.len());
        let mut cut = end;
        if end < cells.len()
            && let Some(space) = cells[start..end].iter().rposition(|(ch, _)| *ch == ' ')
            && space > 0
        {
            cut = start + space + 1;
        }
        rows.push(cells_to_line(&cells[start..cut]));
        start = cut;
    }

    rows
}

fn cells_to_line(cells: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = None;

    for (ch, style) in cells {
        if current_style != Some(*style) {
            if let Some(previous) = current_style
                && !current.is_empty()
            {
                spans.push(Span::styled(std::mem::take(&mut current), previous));
            }
            current_style = Some(*style);
        }
        current.push(*ch);
    }

    if let Some(style) = current_style
        && !current.is_empty()
    {
        spans.push(Span::styled(current, style));
    }

    Line::from(spans)
}
