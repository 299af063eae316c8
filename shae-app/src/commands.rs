//! Slash commands for the terminal driver.

pub const HELP: &str = "Commands: /try /skip /done /stop /burn <text> /status /reset /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Start the pending suggestion.
    Try,
    /// Skip the pending or active action.
    Skip,
    /// Complete the active action.
    Done,
    /// Stop a running countdown early.
    Stop,
    Burn(String),
    Status,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

/// `None` means the input is a chat message, not a command.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match name {
        "/try" | "/start" => ChatCommand::Try,
        "/skip" => ChatCommand::Skip,
        "/done" => ChatCommand::Done,
        "/stop" => ChatCommand::Stop,
        "/burn" => ChatCommand::Burn(rest.to_string()),
        "/status" => ChatCommand::Status,
        "/reset" | "/new" => ChatCommand::Reset,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}
