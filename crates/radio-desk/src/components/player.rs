//! Player panel: current song, progress and the play/mute buttons.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::action::Action;
use crate::app_state::DeskView;
use crate::component::PanelContent;
use crate::components::{inner_point, row};
use crate::panel::{PanelId, Point};
use crate::widgets::progress_bar::draw_progress;
use crate::widgets::text::{centered, fit_width};

const TITLE_ROW: u16 = 1;
const PROGRESS_ROW: u16 = 5;
const STATUS_ROW: u16 = 7;
const CONTROLS_ROW: u16 = 9;
const NEXT_ROW: u16 = 12;

/// (inner x, width) of each button on the controls row.
const PLAY_BUTTON: (u16, u16) = (6, 13);
const MUTE_BUTTON: (u16, u16) = (23, 13);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Play,
    Mute,
}

#[derive(Default)]
pub struct PlayerPanel;

impl PlayerPanel {
    pub fn new() -> Self {
        Self
    }

    fn control_at(local: Point) -> Option<Control> {
        let size = PanelId::Player.size();
        let (x, y) = inner_point(local, size.width - 2, size.height - 2)?;
        if y != CONTROLS_ROW {
            return None;
        }
        let within = |(start, width): (u16, u16)| x >= start && x < start + width;
        if within(PLAY_BUTTON) {
            Some(Control::Play)
        } else if within(MUTE_BUTTON) {
            Some(Control::Mute)
        } else {
            None
        }
    }
}

fn button_label(text: &str, width: u16) -> String {
    format!("[{:^w$}]", text, w = usize::from(width.saturating_sub(2)))
}

impl PanelContent for PlayerPanel {
    fn id(&self) -> PanelId {
        PanelId::Player
    }

    fn click(&mut self, local: Point, _view: &DeskView) -> Vec<Action> {
        match Self::control_at(local) {
            Some(Control::Play) => vec![Action::TogglePlay],
            Some(Control::Mute) => vec![Action::ToggleMute],
            None => Vec::new(),
        }
    }

    fn badge(&self, view: &DeskView) -> Option<String> {
        view.intent.playing.then(|| "on air".to_string())
    }

    fn draw(&mut self, buf: &mut Buffer, area: Rect, _focused: bool, view: &DeskView) {
        let palette = view.palette();
        let width = usize::from(area.width);
        let song = view.snapshot.and_then(|s| s.current_song());

        let mut put = |y: u16, line: Line| {
            if let Some(r) = row(area, y) {
                Paragraph::new(line).render(r, buf);
            }
        };

        match song {
            Some(song) => {
                put(
                    TITLE_ROW,
                    Line::from(Span::styled(centered(&song.title, width), palette.style_title())),
                );
                put(
                    TITLE_ROW + 1,
                    Line::from(Span::styled(
                        centered(&song.artist, width),
                        palette.style_secondary(),
                    )),
                );
                put(
                    TITLE_ROW + 2,
                    Line::from(Span::styled(centered(&song.album, width), palette.style_muted())),
                );
            }
            None => put(
                TITLE_ROW + 1,
                Line::from(Span::styled(
                    centered("waiting for music…", width),
                    palette.style_muted(),
                )),
            ),
        }

        let status = match (view.start_error, view.intent.playing) {
            (Some(err), true) => Span::styled(
                centered(&format!("can't start audio: {}", err), width),
                palette.style_error(),
            ),
            (_, true) => Span::styled(centered("● playing", width), palette.style_playing()),
            (_, false) => Span::styled(centered("paused", width), palette.style_muted()),
        };
        put(STATUS_ROW, Line::from(status));

        let play = if view.intent.playing { "❚❚ pause" } else { "▶ play" };
        let mute = if view.intent.muted { "unmute" } else { "mute" };
        let pad = |n: u16| " ".repeat(usize::from(n));
        put(
            CONTROLS_ROW,
            Line::from(vec![
                Span::raw(pad(PLAY_BUTTON.0)),
                Span::styled(
                    button_label(play, PLAY_BUTTON.1),
                    palette.style_accent().add_modifier(Modifier::BOLD),
                ),
                Span::raw(pad(MUTE_BUTTON.0 - PLAY_BUTTON.0 - PLAY_BUTTON.1)),
                Span::styled(
                    button_label(mute, MUTE_BUTTON.1),
                    if view.intent.muted {
                        palette.style_accent()
                    } else {
                        palette.style_secondary()
                    },
                ),
            ]),
        );

        if let Some(next) = view.snapshot.and_then(|s| s.next_song()) {
            let text = fit_width(&format!("up next: {}", next.display()), width.saturating_sub(2));
            put(NEXT_ROW, Line::from(Span::styled(format!(" {}", text), palette.style_muted())));
        }

        if let Some(r) = row(area, PROGRESS_ROW) {
            let bar_area = Rect::new(r.x + 2, r.y, r.width.saturating_sub(4), 1);
            draw_progress(
                buf,
                bar_area,
                view.progress,
                view.elapsed,
                view.duration(),
                palette,
            );
        }
    }
}
