//! Terminal rendering for command results
//!
//! Colors are used only when stdout is a terminal, so piped output stays
//! plain.

pub mod outcome;
pub mod table;

pub use outcome::{heading, ingest_summary, report, Outcome};
pub use table::{asts_table, categories_table, files_table, projects_table, stats_table};

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static COLOR: OnceLock<bool> = OnceLock::new();

/// Emphasis of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Done,
    Caution,
    Detail,
    Quiet,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Tone::Heading => Style::new().cyan().bold(),
            Tone::Done => Style::new().green().bold(),
            Tone::Caution => Style::new().yellow().bold(),
            Tone::Detail => Style::new().white().dimmed(),
            Tone::Quiet => Style::new().bright_black(),
        }
    }
}

fn color_enabled() -> bool {
    *COLOR.get_or_init(|| console::Term::stdout().is_term())
}

pub fn paint(text: &str, tone: Tone) -> String {
    if color_enabled() {
        text.style(tone.style()).to_string()
    } else {
        text.to_string()
    }
}
