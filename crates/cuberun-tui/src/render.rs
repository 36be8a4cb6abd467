use crate::app::App;
use crate::run::{HORIZON, LANES};
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use cuberun_core::{KeyValueStore, OverlayView, SyncDispatcher};
use std::io;

const LANE_WIDTH: u16 = 7;

/// Render the whole frame
pub fn render<S: KeyValueStore, D: SyncDispatcher>(
    stdout: &mut io::Stdout,
    app: &App<S, D>,
) -> io::Result<()> {
    let (width, height) = terminal::size()?;

    match app.overlay() {
        Some(view) => render_overlay(stdout, app, &view, width, height)?,
        None => {
            execute!(
                stdout,
                SetBackgroundColor(app.theme.bg),
                Clear(ClearType::All)
            )?;
            render_track(stdout, app, width, height)?;
            render_hud(stdout, app, width, height)?;
        }
    }

    execute!(stdout, SetAttribute(Attribute::Reset))
}

fn render_track<S: KeyValueStore, D: SyncDispatcher>(
    stdout: &mut io::Stdout,
    app: &App<S, D>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let track_width = LANE_WIDTH * LANES as u16 + 1;
    let left = width.saturating_sub(track_width) / 2;
    let top = 2;
    let bottom = height.saturating_sub(3).max(top + 2);

    // Lane separators
    for y in top..=bottom {
        for lane in 0..=LANES as u16 {
            execute!(
                stdout,
                MoveTo(left + lane * LANE_WIDTH, y),
                SetForegroundColor(app.theme.lane),
                Print("│")
            )?;
        }
    }

    let lane_x = |lane: usize| left + lane as u16 * LANE_WIDTH + 2;
    let rows = (bottom - top) as f64;

    for obstacle in app.run.obstacles() {
        let progress = 1.0 - (obstacle.distance / HORIZON).clamp(0.0, 1.0);
        let y = top + (progress * rows) as u16;
        execute!(
            stdout,
            MoveTo(lane_x(obstacle.lane), y),
            SetForegroundColor(app.theme.obstacle),
            Print("▆▆▆")
        )?;
    }

    execute!(
        stdout,
        MoveTo(lane_x(app.run.lane()), bottom),
        SetForegroundColor(app.theme.player),
        Print("███")
    )?;

    Ok(())
}

fn render_hud<S: KeyValueStore, D: SyncDispatcher>(
    stdout: &mut io::Stdout,
    app: &App<S, D>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let score = if app.run.is_over() {
        format!("CRASHED {:>8.0}", app.run.score().trunc())
    } else {
        format!("SCORE {:>8.0}", app.run.score().trunc())
    };
    execute!(
        stdout,
        MoveTo(width.saturating_sub(score.len() as u16) / 2, 0),
        SetForegroundColor(app.theme.info),
        Print(&score)
    )?;

    let controls = "←/→ steer   q quit";
    execute!(
        stdout,
        MoveTo(
            width.saturating_sub(controls.chars().count() as u16) / 2,
            height.saturating_sub(1)
        ),
        SetForegroundColor(app.theme.key),
        Print(controls)
    )?;
    Ok(())
}

fn render_overlay<S: KeyValueStore, D: SyncDispatcher>(
    stdout: &mut io::Stdout,
    app: &App<S, D>,
    view: &OverlayView,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let bg = app.theme.overlay_bg(view.background_alpha);
    execute!(stdout, SetBackgroundColor(bg), Clear(ClearType::All))?;

    let center = |text_len: usize| width.saturating_sub(text_len as u16) / 2;
    let mut y = height.saturating_sub(14) / 2;

    execute!(
        stdout,
        MoveTo(center(view.title.len()), y),
        SetForegroundColor(app.theme.title),
        SetAttribute(Attribute::Bold),
        Print(view.title),
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(bg)
    )?;
    y += 2;

    // Two columns: the run's score on the left, the table on the right
    let left_x = (width / 2).saturating_sub(16);
    let right_x = width / 2 + 4;

    execute!(
        stdout,
        MoveTo(left_x, y),
        SetForegroundColor(app.theme.info),
        Print("SCORE"),
        MoveTo(right_x, y),
        Print("HIGH SCORES"),
        MoveTo(left_x, y + 2),
        SetForegroundColor(app.theme.fg),
        SetAttribute(Attribute::Bold),
        Print(&view.score_label),
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(bg)
    )?;

    for (i, slot) in view.slots.iter().enumerate() {
        let row = y + 2 + i as u16;
        execute!(
            stdout,
            MoveTo(right_x, row),
            SetForegroundColor(app.theme.info),
            Print(format!("{}  ", slot.rank)),
            SetForegroundColor(app.theme.fg)
        )?;
        if slot.underlined {
            execute!(stdout, SetAttribute(Attribute::Underlined))?;
        }
        execute!(
            stdout,
            Print(&slot.label),
            SetAttribute(Attribute::NoUnderline)
        )?;
    }
    y += 2 + view.slots.len() as u16 + 2;

    let button = format!("[ {} ]", view.restart_label);
    execute!(
        stdout,
        MoveTo(center(button.len()), y),
        SetForegroundColor(Color::White),
        Print(&button),
        MoveTo(center(24), y + 2),
        SetForegroundColor(app.theme.key),
        Print("r restart      q quit")
    )?;

    Ok(())
}
