//! Status bar renderer - mode badge plus either a notification or a message.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::state::{InputMode, Notification, NotificationKind};
use crate::terminal::Surface;
use crate::types::{Color, Style};

/// The part of a notification the status bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NotificationKind,
    pub message: String,
}

impl From<&Notification> for Notice {
    fn from(notification: &Notification) -> Self {
        Self {
            kind: notification.kind,
            message: notification.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBarData {
    pub mode: InputMode,
    /// Shown when there is no notice.
    pub message: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusBarRenderer;

impl StatusBarRenderer {
    /// Badge text and style for a mode. Normal has no badge.
    pub fn badge(mode: InputMode) -> Option<(&'static str, Style)> {
        match mode {
            InputMode::Normal => None,
            InputMode::Command => Some((
                " COMMAND ",
                Style::new().fg(Color::Black).bg(Color::Green).bold(),
            )),
            InputMode::Insert => Some((
                " INSERT ",
                Style::new().fg(Color::White).bg(Color::Blue).bold(),
            )),
            InputMode::Select => Some((
                " SELECT ",
                Style::new().fg(Color::Black).bg(Color::Cyan).bold(),
            )),
        }
    }

    fn notice_color(kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Info => Color::Blue,
            NotificationKind::Success => Color::Green,
            NotificationKind::Warning => Color::Yellow,
            NotificationKind::Error => Color::Red,
        }
    }
}

impl Renderer for StatusBarRenderer {
    type Data = StatusBarData;

    fn render(&self, surface: &mut dyn Surface, data: &StatusBarData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        surface.style_reset();
        clear_row(surface, dims, 0);

        let mut room = dims.content_width as usize;
        if let Some((label, style)) = Self::badge(data.mode) {
            write_clipped(surface, label, style, &mut room);
            write_clipped(surface, " ", Style::new(), &mut room);
        }

        match (&data.notice, &data.message) {
            (Some(notice), _) => {
                let color = Self::notice_color(notice.kind);
                let icon = format!(" {} ", notice.kind.icon());
                write_clipped(surface, &icon, Style::new().fg(color).bold(), &mut room);
                write_clipped(surface, &notice.message, Style::new().fg(color), &mut room);
            }
            (None, Some(message)) => {
                write_clipped(surface, message, Style::new(), &mut room);
            }
            (None, None) => {}
        }
    }
}
