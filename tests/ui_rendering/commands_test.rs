use anyhow::Result;
use course_assistant::assistant::conversation::Role;
use course_assistant::assistant::profile::Profile;
use course_assistant::cli::test_support::UiHarness;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::ui_rendering::common::{
    answer_body, header_snapshot, mount_answer, new_harness, status_snapshot, submit_line,
    timeline_snapshot,
};

#[tokio::test]
async fn help_lists_commands_in_timeline() -> Result<()> {
    let mut harness = new_harness("cmd-help", 120, 30, None)?;
    submit_line(&mut harness, "/help").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("cmd> /help"));
    assert!(timeline.contains("Available commands:"));
    assert!(timeline.contains("/profile [logistics|teaching]"));

    Ok(())
}

#[tokio::test]
async fn clear_starts_a_new_conversation() -> Result<()> {
    let server = MockServer::start().await;
    mount_answer(&server, "October 14.").await;

    let mut harness = new_harness("cmd-clear", 120, 30, Some(&server.uri()))?;
    submit_line(&mut harness, "When is the midterm?").await?;
    assert_eq!(harness.conversation().len(), 2);

    submit_line(&mut harness, "/clear").await?;
    assert!(harness.conversation().is_empty());

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.starts_with("Welcome!"));
    assert!(!timeline.contains("October 14."));

    let status = status_snapshot(&harness)?;
    assert!(status.contains("Messages in conversation: 0"));
    assert!(status.contains("Conversation cleared."));

    submit_line(&mut harness, "/stats").await?;
    assert!(timeline_snapshot(&harness)?.contains("Conversations cleared: 1"));

    Ok(())
}

#[tokio::test]
async fn history_and_stats_summarize_the_conversation() -> Result<()> {
    let server = MockServer::start().await;
    mount_answer(&server, "Submit on the course portal.").await;

    let mut harness = new_harness("cmd-history", 120, 40, Some(&server.uri()))?;
    submit_line(&mut harness, "How do I submit?").await?;
    submit_line(&mut harness, "/history 1").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("assistant: Submit on the course portal."));
    assert!(!timeline.contains("you: How do I submit?"));

    submit_line(&mut harness, "/history").await?;
    assert!(timeline_snapshot(&harness)?.contains("you: How do I submit?"));

    submit_line(&mut harness, "/stats").await?;
    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("Messages in conversation: 2"));
    assert!(timeline.contains("Tokens (session): input 30, output 12, total 42"));

    Ok(())
}

#[tokio::test]
async fn profile_switch_changes_header_and_resets_conversation() -> Result<()> {
    let server = MockServer::start().await;
    mount_answer(&server, "Sure.").await;

    let mut harness = new_harness("cmd-profile", 120, 30, Some(&server.uri()))?;
    submit_line(&mut harness, "hello").await?;
    assert!(header_snapshot(&harness)?.starts_with("Course Logistics Assistant"));

    submit_line(&mut harness, "/profile teaching").await?;
    assert_eq!(harness.ui_state_view().profile, Profile::Teaching);
    assert!(harness.conversation().is_empty());

    let header = header_snapshot(&harness)?;
    assert!(header.starts_with("Course Assistant"));
    assert!(header.contains("Your AI teaching assistant"));
    assert!(status_snapshot(&harness)?.contains("Switched to teaching profile"));

    submit_line(&mut harness, "/profile").await?;
    assert!(timeline_snapshot(&harness)?.contains("profile: teaching (Course Assistant)"));

    submit_line(&mut harness, "hello again").await?;
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body)?;
    assert!(
        body["system"]
            .as_str()
            .expect("system prompt string")
            .starts_with("You are a helpful teaching assistant")
    );

    Ok(())
}

#[tokio::test]
async fn kb_and_trace_report_paths() -> Result<()> {
    let mut harness = new_harness("cmd-kb", 120, 30, None)?;
    submit_line(&mut harness, "/kb").await?;
    submit_line(&mut harness, "/trace").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("knowledge base: knowledge_base.txt ("));
    assert!(timeline.contains("Trace file: "));

    let trace = std::fs::read_to_string(harness.trace_path())?;
    assert!(trace.contains("[cmd.in     ] /kb"));
    assert!(trace.contains(&harness.trace_path().display().to_string()));

    Ok(())
}

#[tokio::test]
async fn invalid_commands_print_usage() -> Result<()> {
    let mut harness = new_harness("cmd-usage", 120, 30, None)?;
    submit_line(&mut harness, "/profile tutor").await?;
    submit_line(&mut harness, "/bogus").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("usage: /profile [logistics|teaching]"));
    assert!(timeline.contains("unknown command '/bogus'. Try /help"));
    assert_eq!(harness.ui_state_view().profile, Profile::Logistics);

    Ok(())
}

#[tokio::test]
async fn quit_command_and_exit_word_stop_the_app() -> Result<()> {
    let mut harness = new_harness("cmd-quit", 100, 30, None)?;
    submit_line(&mut harness, "/quit").await?;
    assert!(harness.ui_state_view().should_quit);

    let mut harness = new_harness("cmd-exit", 100, 30, None)?;
    submit_line(&mut harness, "exit").await?;
    assert!(harness.ui_state_view().should_quit);

    Ok(())
}

fn submit_nowait(harness: &mut UiHarness, line: &str) -> Result<()> {
    for ch in line.chars() {
        harness.send_key_nowait(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))?;
    }
    harness.send_key_nowait(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

#[tokio::test]
async fn clear_and_profile_switch_are_refused_while_answer_is_pending() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(answer_body("Late answer.", 20, 5))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let mut harness = new_harness("cmd-busy", 120, 30, Some(&server.uri()))?;
    submit_nowait(&mut harness, "When is the final?")?;
    assert!(harness.ui_state_view().waiting);

    submit_nowait(&mut harness, "/clear")?;
    submit_nowait(&mut harness, "/profile teaching")?;

    let view = harness.ui_state_view();
    assert!(view.waiting);
    assert_eq!(view.profile, Profile::Logistics);
    let refusals = timeline_snapshot(&harness)?
        .matches("Wait for the current answer before starting a new conversation.")
        .count();
    assert_eq!(refusals, 2);

    harness.settle().await?;
    let roles = harness
        .conversation()
        .iter()
        .map(|message| message.role)
        .collect::<Vec<_>>();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(harness.ui_state_view().profile, Profile::Logistics);
    assert!(timeline_snapshot(&harness)?.contains("Late answer."));

    Ok(())
}
