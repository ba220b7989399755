//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the consultation without sending messages
//! to the API.

/// A parsed chat command.
///
/// These commands control the consultation and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// List the specialist catalog.
    Specialists,

    /// Switch to the specialist with this id.
    Specialist(String),

    /// Attach image files, in order.
    Attach(Vec<String>),

    /// Remove the attachment at this 1-based position.
    Detach(usize),

    /// List pending attachments.
    Attachments,

    /// Send pending attachments without text.
    Send,

    /// Start over with the current specialist.
    Reset,

    /// Reprint the conversation log.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use asclepius::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/specialist cardio").is_some());
/// assert!(parse_command("Saya demam sejak kemarin").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "specialists" | "list" => ChatCommand::Specialists,
        "specialist" | "sp" => match argument {
            Some(id) => ChatCommand::Specialist(id.to_string()),
            None => ChatCommand::Invalid("/specialist requires a specialist id".to_string()),
        },
        "attach" => match argument {
            Some(paths) => ChatCommand::Attach(paths.split_whitespace().map(String::from).collect()),
            None => ChatCommand::Invalid("/attach requires at least one file path".to_string()),
        },
        "detach" => match argument.map(str::parse::<usize>) {
            Some(Ok(position)) if position > 0 => ChatCommand::Detach(position),
            Some(_) => ChatCommand::Invalid("/detach expects a positive integer".to_string()),
            None => ChatCommand::Invalid("/detach requires an attachment number".to_string()),
        },
        "attachments" => ChatCommand::Attachments,
        "send" => ChatCommand::Send,
        "reset" | "clear" => ChatCommand::Reset,
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /specialists           List the available specialists
  /specialist <id>       Consult another specialist (starts over)
  /attach <path>...      Attach image files (up to 4)
  /detach <n>            Remove attachment number n
  /attachments           List pending attachments
  /send                  Send the pending attachments without text
  /reset                 Start a new consultation
  /history               Reprint the conversation
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat
Any other line is sent to the specialist together with pending attachments."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_reset() {
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Reset));
    }

    #[test]
    fn parse_specialist() {
        assert_eq!(
            parse_command("/specialist cardio"),
            Some(ChatCommand::Specialist("cardio".to_string()))
        );
        assert_eq!(
            parse_command("/specialist    eye  "),
            Some(ChatCommand::Specialist("eye".to_string()))
        );
        assert!(matches!(
            parse_command("/specialist"),
            Some(ChatCommand::Invalid(_))
        ));
        assert_eq!(parse_command("/specialists"), Some(ChatCommand::Specialists));
    }

    #[test]
    fn parse_attach() {
        assert_eq!(
            parse_command("/attach rash.jpg  xray.png"),
            Some(ChatCommand::Attach(vec![
                "rash.jpg".to_string(),
                "xray.png".to_string()
            ]))
        );
        assert!(matches!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_detach() {
        assert_eq!(parse_command("/detach 2"), Some(ChatCommand::Detach(2)));
        assert!(matches!(
            parse_command("/detach 0"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/detach two"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/detach"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("/attachments"), Some(ChatCommand::Attachments));
        assert_eq!(parse_command("/send"), Some(ChatCommand::Send));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse_command("/model gemini-2.5-pro"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Saya batuk"), None);
        assert_eq!(parse_command("dosis 1/2 tablet"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/specialist"));
        assert!(help.contains("/attach"));
        assert!(help.contains("/reset"));
    }
}
