use crate::assistant::profile::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Clear,
    History(Option<usize>),
    Stats,
    Trace,
    Profile(Option<Profile>),
    KnowledgeBase,
    Sidebar(Option<bool>),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("not a command")]
    NotACommand,
    #[error("empty command. Try /help")]
    Empty,
    #[error("unknown command '/{0}'. Try /help")]
    Unknown(String),
    #[error("usage: /{name}{}", usage_suffix(.args))]
    Usage { name: &'static str, args: &'static str },
    #[error("usage: /history [n] (n must be >= 1)")]
    ZeroHistory,
}

/// One row of the `/help` listing. `args` doubles as the usage hint.
struct CommandInfo {
    name: &'static str,
    args: &'static str,
    about: &'static str,
}

const COMMANDS: [CommandInfo; 9] = [
    CommandInfo { name: "help", args: "", about: "Show this command list" },
    CommandInfo { name: "clear", args: "", about: "Start a new conversation" },
    CommandInfo {
        name: "history",
        args: "[n]",
        about: "Show the conversation (or last n messages)",
    },
    CommandInfo { name: "stats", args: "", about: "Show message and token counts" },
    CommandInfo { name: "trace", args: "", about: "Show path to the current trace file" },
    CommandInfo {
        name: "profile",
        args: "[logistics|teaching]",
        about: "Show or switch the assistant profile",
    },
    CommandInfo { name: "kb", args: "", about: "Show knowledge base status" },
    CommandInfo {
        name: "sidebar",
        args: "[on|off]",
        about: "Show, hide or toggle the help sidebar",
    },
    CommandInfo { name: "quit", args: "", about: "Leave the assistant" },
];

pub(crate) fn help_text() -> String {
    let mut text = String::from("Available commands:");
    for info in &COMMANDS {
        let usage = format!("/{}{}", info.name, usage_suffix(info.args));
        text.push_str(&format!("\n  {usage:<31}{}", info.about));
    }
    text
}

fn usage_suffix(args: &str) -> String {
    if args.is_empty() {
        String::new()
    } else {
        format!(" {args}")
    }
}

fn usage(name: &str) -> ParseError {
    let info = COMMANDS
        .iter()
        .find(|info| info.name == name)
        .unwrap_or(&COMMANDS[0]);
    ParseError::Usage {
        name: info.name,
        args: info.args,
    }
}

pub(crate) fn is_command_line(line: &str) -> bool {
    line.starts_with('/')
}

/// Parses a `/name [args]` line. Names are case-insensitive, arguments are not.
pub(crate) fn parse_command(line: &str) -> Result<Command, ParseError> {
    let body = line.strip_prefix('/').ok_or(ParseError::NotACommand)?;
    let (name, args) = match body.trim_end().split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body.trim_end(), ""),
    };
    if name.is_empty() {
        return Err(ParseError::Empty);
    }

    let name = name.to_ascii_lowercase();
    let no_args = |command: Command| {
        if args.is_empty() {
            Ok(command)
        } else {
            Err(usage(&name))
        }
    };

    match name.as_str() {
        "help" => no_args(Command::Help),
        "clear" => no_args(Command::Clear),
        "stats" => no_args(Command::Stats),
        "trace" => no_args(Command::Trace),
        "kb" => no_args(Command::KnowledgeBase),
        "quit" | "exit" => no_args(Command::Quit).map_err(|_| usage("quit")),
        "history" => match args {
            "" => Ok(Command::History(None)),
            n => match n.parse::<usize>() {
                Ok(0) => Err(ParseError::ZeroHistory),
                Ok(n) => Ok(Command::History(Some(n))),
                Err(_) => Err(usage("history")),
            },
        },
        "profile" => match args {
            "" => Ok(Command::Profile(None)),
            value => value
                .parse::<Profile>()
                .map(|profile| Command::Profile(Some(profile)))
                .map_err(|_| usage("profile")),
        },
        "sidebar" => match args {
            "" => Ok(Command::Sidebar(None)),
            "on" => Ok(Command::Sidebar(Some(true))),
            "off" => Ok(Command::Sidebar(Some(false))),
            _ => Err(usage("sidebar")),
        },
        _ => Err(ParseError::Unknown(name.clone())),
    }
}
