use anyhow::Result;
use course_assistant::cli::test_support::UiHarness;
use crossterm::event::{KeyCode, MouseEventKind};

use crate::ui_rendering::common::{new_harness, press, submit_line, timeline_snapshot, wheel};

fn seeded(session_id: &str, turns: usize) -> Result<UiHarness> {
    let mut harness = new_harness(session_id, 100, 24, None)?;
    for i in 0..turns {
        harness.seed_answered_turn(&format!("question {i}"), &format!("answer {i}"))?;
    }
    Ok(harness)
}

#[tokio::test]
async fn wheel_outside_the_timeline_is_ignored() -> Result<()> {
    let mut harness = seeded("scroll-mouse-area", 24)?;
    let regions = harness.regions()?;
    let sidebar = regions.sidebar.expect("sidebar visible at 100 columns");

    assert_eq!(wheel(&mut harness, MouseEventKind::ScrollUp, regions.input)?, 0);
    assert_eq!(wheel(&mut harness, MouseEventKind::ScrollUp, regions.header)?, 0);

    let scrolled = wheel(&mut harness, MouseEventKind::ScrollUp, regions.timeline)?;
    assert!(scrolled > 0);

    for area in [sidebar, regions.status, regions.footer] {
        assert_eq!(wheel(&mut harness, MouseEventKind::ScrollDown, area)?, scrolled);
    }

    let back = wheel(&mut harness, MouseEventKind::ScrollDown, regions.timeline)?;
    assert!(back < scrolled);

    Ok(())
}

#[tokio::test]
async fn wheel_scroll_is_clamped_at_both_ends() -> Result<()> {
    let mut harness = seeded("scroll-clamp", 32)?;
    let timeline = harness.regions()?.timeline;

    let mut top = 0;
    for _ in 0..200 {
        top = wheel(&mut harness, MouseEventKind::ScrollUp, timeline)?;
    }
    assert!(top > 0);
    assert!(timeline_snapshot(&harness)?.starts_with("you> question 0"));
    assert_eq!(wheel(&mut harness, MouseEventKind::ScrollUp, timeline)?, top);

    let mut bottom = top;
    for _ in 0..200 {
        bottom = wheel(&mut harness, MouseEventKind::ScrollDown, timeline)?;
    }
    assert_eq!(bottom, 0);
    assert!(timeline_snapshot(&harness)?.ends_with("answer 31"));

    Ok(())
}

#[tokio::test]
async fn page_keys_scroll_and_submission_snaps_to_bottom() -> Result<()> {
    let mut harness = seeded("scroll-page", 20)?;

    press(&mut harness, KeyCode::PageUp).await?;
    assert!(harness.ui_state_view().timeline_scroll > 0);

    press(&mut harness, KeyCode::PageDown).await?;
    assert_eq!(harness.ui_state_view().timeline_scroll, 0);

    press(&mut harness, KeyCode::PageUp).await?;
    submit_line(&mut harness, "/stats").await?;
    assert_eq!(harness.ui_state_view().timeline_scroll, 0);
    assert!(timeline_snapshot(&harness)?.contains("Messages in conversation: 40"));

    Ok(())
}
