use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

const HELP_MD: &str = include_str!("help/help.md");

#[derive(Debug, Clone)]
pub struct HelpContent {
    lines: Vec<Line<'static>>,
}

impl Default for HelpContent {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpContent {
    pub fn new() -> Self {
        Self {
            lines: parse_markdown(HELP_MD),
        }
    }

    pub fn text(&self) -> Text<'static> {
        Text::from(self.lines.clone())
    }
}

fn parse_markdown(markdown: &str) -> Vec<Line<'static>> {
    markdown.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Line<'static> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::from("");
    }

    if let Some(content) = trimmed.strip_prefix("## ") {
        return Line::from(Span::styled(
            content.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(content) = trimmed.strip_prefix("# ") {
        return Line::from(content.to_uppercase());
    }

    if let Some(content) = trimmed.strip_prefix("- ") {
        return Line::from(format!("• {content}"));
    }

    Line::from(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headings_and_bullets() {
        let lines = parse_markdown("# Title\n- item\n\nplain");
        assert_eq!(lines[0], Line::from("TITLE"));
        assert_eq!(lines[1], Line::from("• item"));
        assert_eq!(lines[2], Line::from(""));
        assert_eq!(lines[3], Line::from("plain"));
    }

    #[test]
    fn bundled_help_mentions_every_mode() {
        let text: String = HelpContent::new()
            .lines
            .iter()
            .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        for needle in ["search", "delete", "Ctrl+R", "quit"] {
            assert!(text.contains(needle), "help is missing {needle}");
        }
    }
}
