use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::config::ThemeConfig;

/// Bottom strip: key-label hints on the left, the showing-info text on the
/// right, and a busy marker while a fetch is pending.
pub struct Controls {
    pub info: Option<String>,
    pub busy: bool,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            info: None,
            busy: false,
            bg_color: Color::Indexed(236),
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, info: String) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    pub fn from_theme(theme: &ThemeConfig) -> Self {
        Self {
            info: None,
            busy: false,
            bg_color: theme.controls_bg(),
            key_color: theme.key_hints(),
            label_color: theme.labels(),
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let no_bg = self.bg_color == Color::Reset;
        if !no_bg {
            Block::default()
                .style(Style::default().bg(self.bg_color))
                .render(area, buf);
        }

        let controls: [(&str, &str); 6] = [
            ("/", "Search"),
            ("←/→", "Page"),
            ("s", "Sort"),
            ("o", "Order"),
            ("+", "Page size"),
            ("q", "Quit"),
        ];

        // Width of one key-label pair (fixed; pairs are never shrunk).
        let pair_width = |(key, action): &(&str, &str)| -> u16 {
            (key.chars().count() as u16 + 1) + (action.chars().count() as u16 + 1)
        };

        let info_text = if self.busy {
            "Loading...".to_string()
        } else {
            self.info.clone().unwrap_or_default()
        };
        let info_width = (info_text.chars().count() as u16).saturating_add(1);
        let mut available = area.width.saturating_sub(info_width);

        let mut n_show = 0;
        for pair in controls.iter() {
            let need = pair_width(pair);
            if available >= need {
                available -= need;
                n_show += 1;
            } else {
                break;
            }
        }

        let mut constraints: Vec<Constraint> = controls
            .iter()
            .take(n_show)
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        constraints.push(Constraint::Length(info_width));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_style, label_style, fill_style) = if no_bg {
            (
                Style::default().fg(self.key_color),
                Style::default().fg(self.label_color),
                Style::default(),
            )
        } else {
            let base = Style::default().bg(self.bg_color);
            (base.fg(self.key_color), base.fg(self.label_color), base)
        };

        for (i, (key, action)) in controls.iter().take(n_show).enumerate() {
            let j = i * 2;
            Paragraph::new(*key).style(key_style).render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        let fill_idx = n_show * 2;
        Paragraph::new("")
            .style(fill_style)
            .render(layout[fill_idx], buf);
        Paragraph::new(info_text)
            .style(label_style)
            .right_aligned()
            .render(layout[fill_idx + 1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(controls: &Controls, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        controls.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn shows_info_text_on_the_right() {
        let controls = Controls::new().with_info("Showing 1 to 10 of 25 items.".to_string());
        let content = rendered(&controls, 80);
        assert!(content.contains("Showing 1 to 10 of 25 items."));
        assert!(content.contains("Search"));
    }

    #[test]
    fn busy_replaces_info_with_loading() {
        let controls = Controls::new()
            .with_info("Showing 1 to 10 of 25 items.".to_string())
            .with_busy(true);
        let content = rendered(&controls, 80);
        assert!(content.contains("Loading..."));
        assert!(!content.contains("Showing"));
    }

    #[test]
    fn narrow_area_drops_trailing_hints() {
        let controls = Controls::new();
        let content = rendered(&controls, 14);
        assert!(content.contains("Search"));
        assert!(!content.contains("Quit"));
    }
}
