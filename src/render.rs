//! Terminal rendering for the consultation log.
//!
//! Replies arrive as lightweight markdown: `**bold**` spans and `- ` / `* `
//! list items.  The plain-text renderer turns those into ANSI styling (or
//! strips them when color is off).

use std::io::{self, Stdout, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::codec;
use crate::controller::SessionStats;
use crate::conversation::Turn;
use crate::specialist::{DISCLAIMER_TEXT, SUGGESTED_PROMPTS, Specialist};

/// ANSI escape code for bold text (used for role labels and `**bold**` spans).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the thinking indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the thinking indicator).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the model label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for the disclaimer).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for the patient label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Label printed above user turns.
pub const USER_LABEL: &str = "Pasien";

/// Label printed above model turns.
pub const MODEL_LABEL: &str = "Analisis Medis";

/// Text of the thinking indicator.
pub const THINKING_TEXT: &str = "sedang menganalisis...";

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

/// Trait for rendering the consultation to the terminal.
pub trait Renderer {
    /// Print one turn of the log.
    fn print_turn(&mut self, turn: &Turn);

    /// Print the indicator shown while a reply is outstanding.
    fn print_pending(&mut self, specialist: &Specialist);

    /// Print the greeting for a fresh conversation.
    fn print_welcome(&mut self, specialist: &Specialist);

    /// Print the catalog, marking the selected specialist.
    fn print_specialists(&mut self, catalog: &[Specialist], selected: &Specialist);

    /// Print the pending attachments.
    fn print_attachments(&mut self, attachments: &[String]);

    /// Print the statistics snapshot.
    fn print_stats(&mut self, stats: &SessionStats);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Whether ANSI styling is emitted.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn style(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("{code}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    // Terminal write failures are not actionable here.
    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Renderer for PlainTextRenderer<W> {
    fn print_turn(&mut self, turn: &Turn) {
        let time = format_time(turn);
        if turn.is_user() {
            let label = self.style(ANSI_GREEN, USER_LABEL);
            self.emit(&format!("{label} [{time}]"));
            for (idx, image) in turn.images.iter().enumerate() {
                self.emit(&format!("  {}", describe_attachment(idx, image)));
            }
            if !turn.text.is_empty() {
                self.emit(&indent(&turn.text));
            }
        } else {
            let label = self.style(ANSI_CYAN, MODEL_LABEL);
            self.emit(&format!("{label} [{time}]"));
            let body = format_reply(&turn.text, self.use_color);
            self.emit(&indent(&body));
        }
        self.emit("");
    }

    fn print_pending(&mut self, specialist: &Specialist) {
        let text = format!("{} {} {}", specialist.icon, specialist.name, THINKING_TEXT);
        let line = if self.use_color {
            format!("{ANSI_DIM}{ANSI_ITALIC}{text}{ANSI_RESET}")
        } else {
            text
        };
        self.emit(&line);
    }

    fn print_welcome(&mut self, specialist: &Specialist) {
        let text = format_welcome(specialist);
        let disclaimer = self.style(ANSI_YELLOW, DISCLAIMER_TEXT);
        self.emit(&text);
        self.emit(&disclaimer);
        self.emit("");
    }

    fn print_specialists(&mut self, catalog: &[Specialist], selected: &Specialist) {
        for specialist in catalog {
            let marker = if specialist.id == selected.id { "*" } else { " " };
            let line = format!(
                "{marker} {} {:<10} {}",
                specialist.icon, specialist.id, specialist.name
            );
            let line = if specialist.id == selected.id {
                self.style(ANSI_BOLD, &line)
            } else {
                line
            };
            self.emit(&line);
            self.emit(&format!("      {}", specialist.description));
        }
    }

    fn print_attachments(&mut self, attachments: &[String]) {
        if attachments.is_empty() {
            self.emit("  (tidak ada lampiran)");
            return;
        }
        for (idx, image) in attachments.iter().enumerate() {
            self.emit(&format!("  {}", describe_attachment(idx, image)));
        }
    }

    fn print_stats(&mut self, stats: &SessionStats) {
        for line in format_stats(stats).lines() {
            self.emit(&format!("    {line}"));
        }
    }

    fn print_error(&mut self, error: &str) {
        let line = self.style(ANSI_RED, &format!("Error: {error}"));
        self.emit(&line);
    }

    fn print_info(&mut self, info: &str) {
        let line = self.style(ANSI_DIM, info);
        self.emit(&line);
    }
}

/// Formats reply markdown for the terminal.
///
/// List items become bullets.  `**bold**` spans become ANSI bold, or lose
/// their markers when `use_color` is false.
pub fn format_reply(text: &str, use_color: bool) -> String {
    let replacement = if use_color {
        format!("{ANSI_BOLD}$1{ANSI_RESET}")
    } else {
        "$1".to_string()
    };
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let line = match trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                Some(item) => {
                    let depth = line.len() - trimmed.len();
                    format!("{}• {item}", " ".repeat(depth))
                }
                None => line.to_string(),
            };
            BOLD_SPAN
                .replace_all(&line, replacement.as_str())
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The greeting shown when a conversation starts.
pub fn format_welcome(specialist: &Specialist) -> String {
    let mut text = format!(
        "{} Halo, saya {}.\n{}\n\nContoh pertanyaan:",
        specialist.icon, specialist.name, specialist.description
    );
    for prompt in SUGGESTED_PROMPTS {
        text.push_str("\n  - ");
        text.push_str(prompt);
    }
    text
}

/// The lines of the `/stats` view.
pub fn format_stats(stats: &SessionStats) -> String {
    let thinking = match stats.thinking_budget {
        Some(budget) => format!("{budget} tokens"),
        None => "default".to_string(),
    };
    format!(
        "Session Statistics:\n  \
         Specialist: {} ({})\n  \
         Model: {}\n  \
         Thinking budget: {}\n  \
         Session active: {}\n  \
         Turns: {}\n  \
         Pending attachments: {}\n  \
         Requests: {} ({} failed)\n  \
         Tokens: {} prompt / {} reply / {} thinking",
        stats.specialist_name,
        stats.specialist_id,
        stats.model,
        thinking,
        if stats.session_active { "yes" } else { "no" },
        stats.turn_count,
        stats.pending_attachments,
        stats.total_sends,
        stats.failed_sends,
        stats.usage.prompt_token_count,
        stats.usage.candidates_token_count,
        stats.usage.thoughts_token_count,
    )
}

fn describe_attachment(idx: usize, image: &str) -> String {
    match codec::parse_data_url(image) {
        Some(blob) => format!(
            "[{}] {} ({} bytes)",
            idx + 1,
            blob.mime_type,
            blob.data.len()
        ),
        None => format!("[{}] (unreadable image)", idx + 1),
    }
}

fn format_time(turn: &Turn) -> String {
    turn.created_at
        .format(time::macros::format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
