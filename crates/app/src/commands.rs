//! Local command interpreter
//!
//! Lines starting with `/` are commands; anything else is chat text for
//! the currently selected destination.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add PHONE NAME` - append a contact.
    Add { number: String, name: String },
    /// `/del NAME_OR_PHONE` - remove the first matching contact.
    Del { target: String },
    /// `/send NAME` - select the destination contact.
    Send { name: String },
    /// `/list` - list the directory.
    List,
    /// `/quit` - persist and exit.
    Quit,
    /// Plain text: an outbound chat message.
    Say { text: String },
    /// Unrecognized slash command.
    Unknown { input: String },
    /// Recognized command with bad arguments; carries the usage line.
    InvalidArgs { usage: &'static str },
}

/// Parse one submitted line.
pub fn parse(line: &str) -> Command {
    if !line.starts_with('/') {
        return Command::Say {
            text: line.to_string(),
        };
    }

    let mut parts = line.splitn(3, ' ');
    let head = parts.next().unwrap_or_default();

    match head {
        "/add" => match (parts.next(), parts.next()) {
            (Some(number), Some(name)) if !name.trim().is_empty() => Command::Add {
                number: number.to_string(),
                name: name.trim().to_string(),
            },
            _ => Command::InvalidArgs {
                usage: "Usage: /add PHONE NAME",
            },
        },
        "/del" => match rest(line, "/del") {
            Some(target) => Command::Del { target },
            None => Command::InvalidArgs {
                usage: "Usage: /del NAME_OR_PHONE",
            },
        },
        "/send" => match rest(line, "/send") {
            Some(name) => Command::Send { name },
            None => Command::InvalidArgs {
                usage: "Usage: /send NAME",
            },
        },
        "/list" => Command::List,
        "/quit" | "/q" => Command::Quit,
        _ => Command::Unknown {
            input: line.to_string(),
        },
    }
}

/// Everything after the command word, trimmed; `None` if empty.
fn rest(line: &str, head: &str) -> Option<String> {
    let arg = line[head.len()..].trim();
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}
