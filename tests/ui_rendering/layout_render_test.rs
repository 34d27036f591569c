use anyhow::Result;
use crossterm::event::KeyCode;

use crate::ui_rendering::common::{
    footer_snapshot, header_snapshot, input_snapshot, new_harness, press, press_ctrl,
    sidebar_snapshot, status_snapshot, submit_line, timeline_snapshot, type_text,
};

#[tokio::test]
async fn initial_frame_shows_header_welcome_placeholder_and_footer() -> Result<()> {
    let harness = new_harness("layout-initial", 100, 30, None)?;

    insta::assert_snapshot!(header_snapshot(&harness)?, @r"
    Course Logistics Assistant
    Quick answers to syllabus, schedule, and policy questions
    ");
    assert!(timeline_snapshot(&harness)?.starts_with("Welcome! Ask a question below."));
    assert!(
        input_snapshot(&harness)?
            .contains("you> Ask about due dates, policies, office hours...")
    );
    insta::assert_snapshot!(
        status_snapshot(&harness)?,
        @"Course Logistics Assistant | Session: layout-initial | Messages in conversation: 0 | Ready"
    );
    insta::assert_snapshot!(
        footer_snapshot(&harness)?,
        @"This bot only answers logistics questions. For technical help, visit office hours."
    );

    Ok(())
}

#[tokio::test]
async fn sidebar_lists_allowed_and_denied_topics() -> Result<()> {
    let harness = new_harness("layout-sidebar", 100, 30, None)?;

    let sidebar = sidebar_snapshot(&harness)?.expect("sidebar visible on wide terminal");
    assert!(sidebar.contains("What I Can Help With"));
    assert!(sidebar.contains("I can answer:"));
    assert!(sidebar.contains("✓ When are assignments due?"));
    assert!(sidebar.contains("I cannot help with:"));
    assert!(sidebar.contains("✗ Code debugging"));

    Ok(())
}

#[tokio::test]
async fn sidebar_toggles_with_ctrl_b_and_command() -> Result<()> {
    let mut harness = new_harness("layout-toggle", 100, 30, None)?;
    assert!(harness.ui_state_view().show_sidebar);

    press_ctrl(&mut harness, 'b').await?;
    assert!(!harness.ui_state_view().show_sidebar);
    assert!(sidebar_snapshot(&harness)?.is_none());
    assert_eq!(harness.regions()?.timeline.width, 100);

    submit_line(&mut harness, "/sidebar on").await?;
    assert!(sidebar_snapshot(&harness)?.is_some());
    assert!(timeline_snapshot(&harness)?.contains("sidebar: on"));

    submit_line(&mut harness, "/sidebar").await?;
    assert!(sidebar_snapshot(&harness)?.is_none());

    Ok(())
}

#[tokio::test]
async fn narrow_terminal_hides_sidebar_without_changing_preference() -> Result<()> {
    let harness = new_harness("layout-narrow", 60, 24, None)?;
    assert!(harness.ui_state_view().show_sidebar);
    assert!(sidebar_snapshot(&harness)?.is_none());
    assert_eq!(harness.regions()?.timeline.width, 60);

    Ok(())
}

#[tokio::test]
async fn teaching_profile_sidebar_shows_usage_copy() -> Result<()> {
    let mut harness = new_harness("layout-teaching", 100, 30, None)?;
    submit_line(&mut harness, "/profile teaching").await?;

    let sidebar = sidebar_snapshot(&harness)?.expect("sidebar visible");
    assert!(sidebar.contains("How to Use"));
    assert!(sidebar.contains("• Ask about course policies"));
    assert!(
        input_snapshot(&harness)?.contains("you> Ask me about the course...")
    );
    assert!(
        footer_snapshot(&harness)?
            .contains("Remember: Learning happens through understanding, not copying!")
    );

    Ok(())
}

#[tokio::test]
async fn typed_input_replaces_placeholder_and_ctrl_u_clears_it() -> Result<()> {
    let mut harness = new_harness("layout-input", 100, 30, None)?;
    type_text(&mut harness, "late policy").await?;
    assert!(input_snapshot(&harness)?.contains("you> late policy"));
    assert!(!input_snapshot(&harness)?.contains("Ask about due dates"));

    press(&mut harness, KeyCode::Backspace).await?;
    assert_eq!(harness.ui_state_view().input, "late polic");

    press_ctrl(&mut harness, 'u').await?;
    assert_eq!(harness.ui_state_view().input, "");
    assert!(input_snapshot(&harness)?.contains("Ask about due dates"));

    Ok(())
}

#[tokio::test]
async fn up_down_history_recalls_submitted_lines() -> Result<()> {
    let mut harness = new_harness("layout-history", 100, 30, None)?;
    submit_line(&mut harness, "/help").await?;
    submit_line(&mut harness, "/kb").await?;

    press(&mut harness, KeyCode::Up).await?;
    assert_eq!(harness.ui_state_view().input, "/kb");
    press(&mut harness, KeyCode::Up).await?;
    assert_eq!(harness.ui_state_view().input, "/help");
    press(&mut harness, KeyCode::Down).await?;
    assert_eq!(harness.ui_state_view().input, "/kb");
    press(&mut harness, KeyCode::Down).await?;
    assert_eq!(harness.ui_state_view().input, "");

    Ok(())
}
