use anyhow::Result;
use course_assistant::assistant::conversation::{ChatMessage, Role};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::ui_rendering::common::{
    answer_body, mount_answer, new_harness, status_snapshot, submit_line, timeline_snapshot,
    type_text,
};

#[tokio::test]
async fn answered_question_renders_turn_and_updates_conversation() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(answer_body("The final is December 12 in Room 204.", 120, 11)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut harness = new_harness("chat-answer", 100, 30, Some(&server.uri()))?;
    submit_line(&mut harness, "When is the final?").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("you> When is the final?"));
    assert!(timeline.contains("The final is December 12 in Room 204."));
    assert!(timeline.contains("Tokens (turn): 131"));
    assert!(!timeline.contains("Thinking..."));

    assert_eq!(
        harness.conversation(),
        vec![
            ChatMessage::user("When is the final?"),
            ChatMessage::assistant("The final is December 12 in Room 204."),
        ]
    );
    assert!(status_snapshot(&harness)?.ends_with("Messages in conversation: 2 | Ready"));
    assert_eq!(harness.ui_state_view().input, "");

    Ok(())
}

#[tokio::test]
async fn request_carries_system_prompt_and_full_history() -> Result<()> {
    let server = MockServer::start().await;
    mount_answer(&server, "Noted.").await;

    let mut harness = new_harness("chat-history", 100, 30, Some(&server.uri()))?;
    submit_line(&mut harness, "When is the midterm?").await?;
    submit_line(&mut harness, "And office hours?").await?;

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 2);

    let second: Value = serde_json::from_slice(&requests[1].body)?;
    assert_eq!(
        second["messages"],
        json!([
            {"role": "user", "content": "When is the midterm?"},
            {"role": "assistant", "content": "Noted."},
            {"role": "user", "content": "And office hours?"}
        ])
    );
    let system = second["system"].as_str().expect("system prompt string");
    assert!(system.contains("Midterm: October 14, in class."));
    assert!(system.contains("Current date/time: "));
    assert_eq!(second["model"], "claude-3-haiku-20240307");
    assert_eq!(second["max_tokens"], 2000);

    Ok(())
}

#[tokio::test]
async fn in_flight_turn_shows_thinking_and_keeps_new_input() -> Result<()> {
    let server = MockServer::start().await;
    mount_answer(&server, "Tuesdays 2-4 PM.").await;

    let mut harness = new_harness("chat-busy", 100, 30, Some(&server.uri()))?;
    type_text(&mut harness, "Office hours?").await?;
    harness.send_key_nowait(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))?;

    assert!(harness.ui_state_view().waiting);
    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("you> Office hours?"));
    assert!(timeline.contains("  Thinking..."));
    assert!(status_snapshot(&harness)?.ends_with("| Thinking..."));

    for ch in "Where?".chars() {
        harness.send_key_nowait(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))?;
    }
    harness.send_key_nowait(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))?;
    let view = harness.ui_state_view();
    assert_eq!(view.input, "Where?");
    assert!(view.status.contains("Still waiting for the previous answer"));

    harness.settle().await?;
    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("Tuesdays 2-4 PM."));
    assert!(!timeline.contains("Thinking..."));
    assert_eq!(harness.conversation().len(), 2);
    assert_eq!(harness.ui_state_view().input, "Where?");

    Ok(())
}

#[tokio::test]
async fn api_error_shows_hint_and_next_turn_still_works() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_answer(&server, "Recovered answer").await;

    let mut harness = new_harness("chat-recover", 100, 30, Some(&server.uri()))?;
    submit_line(&mut harness, "first try").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("API Error: 401 authentication_error: invalid x-api-key"));
    assert!(timeline.contains("Please check your API key and try again."));
    assert_eq!(harness.conversation(), vec![ChatMessage::user("first try")]);

    submit_line(&mut harness, "second try").await?;
    assert!(timeline_snapshot(&harness)?.contains("Recovered answer"));

    let roles = harness
        .conversation()
        .iter()
        .map(|message| message.role)
        .collect::<Vec<_>>();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);

    let trace = std::fs::read_to_string(harness.trace_path())?;
    assert!(trace.contains("[chat.err   ] API Error: 401"));
    assert!(trace.contains("[chat.out   ] Recovered answer"));

    Ok(())
}

#[tokio::test]
async fn unreachable_api_reports_connection_error_with_key_hint() -> Result<()> {
    let mut harness = new_harness("chat-transport", 100, 30, Some("http://127.0.0.1:9"))?;
    submit_line(&mut harness, "anyone there?").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("API Error: Connection error:"));
    assert!(timeline.contains("Please check your API key and try again."));
    assert!(!timeline.contains("An error occurred"));
    assert_eq!(harness.conversation(), vec![ChatMessage::user("anyone there?")]);

    Ok(())
}

#[tokio::test]
async fn missing_api_key_reports_unavailable_without_recording_question() -> Result<()> {
    let mut harness = new_harness("chat-no-key", 120, 30, None)?;
    submit_line(&mut harness, "When is the final?").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("you> When is the final?"));
    assert!(timeline.contains("Assistant unavailable: missing ANTHROPIC_API_KEY."));
    assert!(harness.conversation().is_empty());
    assert!(!harness.ui_state_view().waiting);

    Ok(())
}
