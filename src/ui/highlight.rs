use colored::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME: &str = "Solarized (dark)";
const MAX_FRAME_WIDTH: usize = 80;
const FALLBACK_FRAME_WIDTH: usize = 60;

/// Renders fenced code blocks with syntax highlighting inside a light frame.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl CodeHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let Some(theme) = self.theme_set.themes.get(THEME) else {
            return code.to_string();
        };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }

        // Reset colours so the footer is not tinted
        output.push_str("\x1b[0m");
        output
    }

    /// A framed, highlighted code block ending in a newline.
    pub fn render_block(&self, code: &str, lang: &str) -> String {
        let width = frame_width();
        let label = format!("[{}]", lang);
        let header_fill = "─".repeat(width.saturating_sub(label.chars().count() + 2));

        let mut output = format!("{}{}{}\n", "┌─".dimmed(), label.cyan(), header_fill.dimmed());

        let body = if code.ends_with('\n') {
            code.to_string()
        } else {
            format!("{}\n", code)
        };
        output.push_str(&self.highlight_code(&body, lang));

        output.push_str(&format!("{}\n", format!("└{}", "─".repeat(width - 1)).dimmed()));
        output
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| (w as usize).min(MAX_FRAME_WIDTH))
        .unwrap_or(FALLBACK_FRAME_WIDTH)
        .max(10)
}
