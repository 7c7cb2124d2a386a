/// Textual commands understood by the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Register,
    Unregister,
    ListManaged,
    GlobalBan,
    GlobalUnban,
}

impl Command {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" | "help" => Some(Self::Start),
            "register" => Some(Self::Register),
            "unregister" => Some(Self::Unregister),
            "list_managed" => Some(Self::ListManaged),
            "globalban" => Some(Self::GlobalBan),
            "globalunban" => Some(Self::GlobalUnban),
            _ => None,
        }
    }
}

/// A `/name[@bot] args...` message, split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub mention: Option<String>,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn command(&self) -> Option<Command> {
        Command::from_name(&self.name)
    }

    /// `false` when the command was explicitly addressed to another bot.
    pub fn is_addressed_to(&self, bot_username: Option<&str>) -> bool {
        match (&self.mention, bot_username) {
            (None, _) => true,
            (Some(m), Some(me)) => m.eq_ignore_ascii_case(me.trim_start_matches('@')),
            (Some(_), None) => false,
        }
    }
}

/// Parse a command message. Returns `None` for non-command text.
///
/// Telegram may send `/cmd@botname arg1 ...`.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let text = text.trim();
    let head = text.strip_prefix('/')?;

    let mut words = head.split_whitespace();
    let first = words.next().unwrap_or("");
    let args = words.map(|s| s.to_string()).collect();

    let (name, mention) = match first.split_once('@') {
        Some((name, bot)) => (name, Some(bot.to_string())),
        None => (first, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_lowercase(),
        mention,
        args,
    })
}
