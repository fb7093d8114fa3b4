use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  /upload <path>   diagnose a leaf image
  /export          save the conversation as a PDF report
  /lang [code]     switch language, or list the available ones
  /restart         start a new conversation
  /help            show this help
  /quit            leave the session
Anything else is sent as a follow-up question once a diagnosis exists.";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Upload(PathBuf),
    Export,
    Language(Option<String>),
    Restart,
    Help,
    Quit,
    /// Plain text, passed through unchanged.
    Ask(String),
    MissingArgument(&'static str),
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|rest| !rest.is_empty())),
            None => (command, None),
        };

        match name {
            "upload" => match argument {
                Some(path) => Self::Upload(PathBuf::from(path)),
                None => Self::MissingArgument("/upload"),
            },
            "export" => Self::Export,
            "lang" | "language" => Self::Language(argument.map(str::to_string)),
            "restart" | "new" => Self::Restart,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(format!("/{other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_questions() {
        assert_eq!(
            ChatCommand::parse("  is it contagious? "),
            ChatCommand::Ask("  is it contagious? ".to_string())
        );
        assert_eq!(ChatCommand::parse(""), ChatCommand::Ask(String::new()));
    }

    #[test]
    fn upload_keeps_paths_with_spaces() {
        assert_eq!(
            ChatCommand::parse("/upload  photos/tomato leaf.jpg "),
            ChatCommand::Upload(PathBuf::from("photos/tomato leaf.jpg"))
        );
        assert_eq!(
            ChatCommand::parse("/upload"),
            ChatCommand::MissingArgument("/upload")
        );
    }

    #[test]
    fn commands_and_aliases() {
        assert_eq!(ChatCommand::parse("/lang kn"), ChatCommand::Language(Some("kn".into())));
        assert_eq!(ChatCommand::parse("/lang"), ChatCommand::Language(None));
        assert_eq!(ChatCommand::parse("/exit"), ChatCommand::Quit);
        assert_eq!(ChatCommand::parse("/new"), ChatCommand::Restart);
        assert_eq!(ChatCommand::parse("/export"), ChatCommand::Export);
        assert_eq!(
            ChatCommand::parse("/frobnicate now"),
            ChatCommand::Unknown("/frobnicate".into())
        );
    }
}
