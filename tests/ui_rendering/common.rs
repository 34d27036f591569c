use anyhow::Result;
use course_assistant::cli::test_support::{UiHarness, deterministic_app_state};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn new_harness(
    session_id: &str,
    width: u16,
    height: u16,
    base_url: Option<&str>,
) -> Result<UiHarness> {
    let state = deterministic_app_state(session_id, base_url)?;
    let mut harness = UiHarness::new(width, height, state)?;
    harness.render()?;
    Ok(harness)
}

pub fn answer_body(text: &str, input_tokens: u64, output_tokens: u64) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": input_tokens, "output_tokens": output_tokens}
    })
}

pub async fn mount_answer(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body(text, 30, 12)))
        .mount(server)
        .await;
}

pub async fn type_text(harness: &mut UiHarness, text: &str) -> Result<()> {
    for ch in text.chars() {
        harness
            .send_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
            .await?;
    }
    Ok(())
}

pub async fn submit_line(harness: &mut UiHarness, line: &str) -> Result<()> {
    type_text(harness, line).await?;
    press_enter(harness).await
}

pub async fn press_enter(harness: &mut UiHarness) -> Result<()> {
    harness
        .send_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
        .await
}

pub async fn press_ctrl(harness: &mut UiHarness, ch: char) -> Result<()> {
    harness
        .send_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
        .await
}

pub async fn press(harness: &mut UiHarness, code: KeyCode) -> Result<()> {
    harness
        .send_key(KeyEvent::new(code, KeyModifiers::NONE))
        .await
}

/// Sends one wheel notch at the centre of `area` and returns the resulting scroll offset.
pub fn wheel(harness: &mut UiHarness, kind: MouseEventKind, area: Rect) -> Result<usize> {
    harness.send_mouse(MouseEvent {
        kind,
        column: area.x + area.width / 2,
        row: area.y + area.height / 2,
        modifiers: KeyModifiers::NONE,
    })?;
    Ok(harness.ui_state_view().timeline_scroll)
}

pub fn normalized_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn region_text(harness: &UiHarness, area: Rect) -> String {
    let lines = harness.buffer_lines();
    let start_row = usize::from(area.y);
    let end_row = start_row.saturating_add(usize::from(area.height));

    let mut rendered = Vec::new();
    for line in lines.iter().take(end_row.min(lines.len())).skip(start_row) {
        let clipped = line
            .chars()
            .skip(usize::from(area.x))
            .take(usize::from(area.width))
            .collect::<String>();
        rendered.push(clipped);
    }

    normalized_text(&rendered.join("\n"))
}

pub fn timeline_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.timeline))
}

pub fn header_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.header))
}

pub fn sidebar_snapshot(harness: &UiHarness) -> Result<Option<String>> {
    let regions = harness.regions()?;
    Ok(regions.sidebar.map(|area| region_text(harness, area)))
}

pub fn input_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.input))
}

pub fn status_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.status))
}

pub fn footer_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.footer))
}
