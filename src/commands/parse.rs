//! Chat-line parsing.
//!
//! A line is `[!]verb args...`. The verb is matched case-insensitively; names
//! keep their case and inner spacing collapses to single spaces.
//!
//! ## Positions
//! `plug` and `plugsub` accept an optional trailing position. The last token is
//! a position only when it is an integer and at least one name token precedes
//! it, so `plug bob 42` plugs someone whose name is `42`.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::queue::ListKind;

/// Every chat verb the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Join,
    Drop,
    Rename,
    ChangeName,
    Plug,
    PlugSub,
    Remove,
    RemoveSub,
    ClearQueue,
    ClearSubs,
    Next,
    Toggle,
    Queue,
    ShowSubs,
    PlayedList,
    AmIFree,
    RemovePlayed,
    ClearPlayed,
    PlugPlayed,
    OptIn,
    OptOut,
    PlugLog,
    RemoveLog,
    ShowLog,
    FillQueue,
    FillSubs,
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Join => "join",
            Verb::Drop => "drop",
            Verb::Rename => "rename",
            Verb::ChangeName => "changename",
            Verb::Plug => "plug",
            Verb::PlugSub => "plugsub",
            Verb::Remove => "remove",
            Verb::RemoveSub => "removesub",
            Verb::ClearQueue => "clearqueue",
            Verb::ClearSubs => "clearsubs",
            Verb::Next => "next",
            Verb::Toggle => "toggle",
            Verb::Queue => "queue",
            Verb::ShowSubs => "showsubs",
            Verb::PlayedList => "playedlist",
            Verb::AmIFree => "amifree",
            Verb::RemovePlayed => "removeplayed",
            Verb::ClearPlayed => "clearplayed",
            Verb::PlugPlayed => "plugplayed",
            Verb::OptIn => "optin",
            Verb::OptOut => "optout",
            Verb::PlugLog => "pluglog",
            Verb::RemoveLog => "removelog",
            Verb::ShowLog => "showlog",
            Verb::FillQueue => "fillqueue",
            Verb::FillSubs => "fillsubs",
        }
    }

    /// Moderator-only verbs.
    pub fn is_privileged(&self) -> bool {
        !matches!(
            self,
            Verb::Join
                | Verb::Drop
                | Verb::Rename
                | Verb::Queue
                | Verb::ShowSubs
                | Verb::PlayedList
                | Verb::AmIFree
                | Verb::OptIn
                | Verb::OptOut
        )
    }

    /// Argument synopsis shown after a malformed command.
    pub fn usage(&self) -> &'static str {
        match self {
            Verb::Join => "!join in_game_name",
            Verb::Rename => "!rename in_game_name",
            Verb::ChangeName => "!changename handle in_game_name",
            Verb::Plug => "!plug handle in_game_name position",
            Verb::PlugSub => "!plugsub handle in_game_name position",
            Verb::Remove => "!remove handle_or_name",
            Verb::RemoveSub => "!removesub handle_or_name",
            Verb::Toggle => "!toggle name",
            Verb::RemovePlayed => "!removeplayed handle",
            Verb::PlugPlayed => "!plugplayed handle",
            Verb::OptIn => "!optin in_game_name",
            Verb::PlugLog => "!pluglog handle in_game_name",
            Verb::RemoveLog => "!removelog handle_or_name",
            Verb::Drop
            | Verb::ClearQueue
            | Verb::ClearSubs
            | Verb::Next
            | Verb::Queue
            | Verb::ShowSubs
            | Verb::PlayedList
            | Verb::AmIFree
            | Verb::ClearPlayed
            | Verb::OptOut
            | Verb::ShowLog
            | Verb::FillQueue
            | Verb::FillSubs => "",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let verb = match value.to_ascii_lowercase().as_str() {
            "join" => Verb::Join,
            "drop" => Verb::Drop,
            "rename" => Verb::Rename,
            "changename" => Verb::ChangeName,
            "plug" => Verb::Plug,
            "plugsub" => Verb::PlugSub,
            "remove" => Verb::Remove,
            "removesub" => Verb::RemoveSub,
            "clearqueue" => Verb::ClearQueue,
            "clearsubs" => Verb::ClearSubs,
            "next" => Verb::Next,
            "toggle" => Verb::Toggle,
            "queue" => Verb::Queue,
            "showsubs" => Verb::ShowSubs,
            "playedlist" => Verb::PlayedList,
            "amifree" => Verb::AmIFree,
            "removeplayed" => Verb::RemovePlayed,
            "clearplayed" => Verb::ClearPlayed,
            "plugplayed" => Verb::PlugPlayed,
            "optin" => Verb::OptIn,
            "optout" => Verb::OptOut,
            "pluglog" => Verb::PlugLog,
            "removelog" => Verb::RemoveLog,
            "showlog" => Verb::ShowLog,
            "fillqueue" => Verb::FillQueue,
            "fillsubs" => Verb::FillSubs,
            other => return Err(UnknownVerb(other.to_string())),
        };
        Ok(verb)
    }
}

/// Fully parsed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Join { name: String },
    Drop,
    Rename { name: String },
    ChangeName { handle: String, name: String },
    Plug { list: ListKind, handle: String, name: String, position: Option<usize> },
    Remove { list: ListKind, needle: String },
    ClearQueue,
    ClearSubs,
    Next,
    Toggle { name: String },
    Queue,
    ShowSubs,
    PlayedList,
    AmIFree,
    RemovePlayed { handle: String },
    ClearPlayed,
    PlugPlayed { handle: String },
    OptIn { name: String },
    OptOut,
    PlugLog { handle: String, name: String },
    RemoveLog { needle: String },
    ShowLog,
    Fill { list: ListKind },
}

impl Command {
    /// Parses the arguments of an already recognised verb.
    ///
    /// # Errors
    /// [`EngineError::InvalidArgument`] when a required argument is missing or
    /// the position is negative.
    pub fn parse(verb: Verb, args: &str) -> Result<Self, EngineError> {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let command = match verb {
            // Admission gates answer before a missing name does.
            Verb::Join => Command::Join {
                name: tokens.join(" "),
            },
            Verb::Drop => Command::Drop,
            Verb::Rename => Command::Rename {
                name: rest(&tokens, "in-game name")?,
            },
            Verb::ChangeName => {
                let (handle, tail) = head(&tokens)?;
                Command::ChangeName {
                    handle,
                    name: rest(tail, "in-game name")?,
                }
            }
            Verb::Plug | Verb::PlugSub => {
                let list = if verb == Verb::Plug {
                    ListKind::Main
                } else {
                    ListKind::Subs
                };
                let (handle, tail) = head(&tokens)?;
                let (name_tokens, position) = split_position(tail)?;
                Command::Plug {
                    list,
                    handle,
                    name: rest(name_tokens, "in-game name")?,
                    position,
                }
            }
            Verb::Remove => Command::Remove {
                list: ListKind::Main,
                needle: rest(&tokens, "handle or name")?,
            },
            Verb::RemoveSub => Command::Remove {
                list: ListKind::Subs,
                needle: rest(&tokens, "handle or name")?,
            },
            Verb::ClearQueue => Command::ClearQueue,
            Verb::ClearSubs => Command::ClearSubs,
            Verb::Next => Command::Next,
            Verb::Toggle => Command::Toggle {
                name: head(&tokens)?.0,
            },
            Verb::Queue => Command::Queue,
            Verb::ShowSubs => Command::ShowSubs,
            Verb::PlayedList => Command::PlayedList,
            Verb::AmIFree => Command::AmIFree,
            Verb::RemovePlayed => Command::RemovePlayed {
                handle: head(&tokens)?.0,
            },
            Verb::ClearPlayed => Command::ClearPlayed,
            Verb::PlugPlayed => Command::PlugPlayed {
                handle: head(&tokens)?.0,
            },
            Verb::OptIn => Command::OptIn {
                name: rest(&tokens, "in-game name")?,
            },
            Verb::OptOut => Command::OptOut,
            Verb::PlugLog => {
                let (handle, tail) = head(&tokens)?;
                Command::PlugLog {
                    handle,
                    name: rest(tail, "in-game name")?,
                }
            }
            Verb::RemoveLog => Command::RemoveLog {
                needle: rest(&tokens, "handle or name")?,
            },
            Verb::ShowLog => Command::ShowLog,
            Verb::FillQueue => Command::Fill {
                list: ListKind::Main,
            },
            Verb::FillSubs => Command::Fill {
                list: ListKind::Subs,
            },
        };
        Ok(command)
    }

    /// The handle or needle this command is about, if it names one.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Command::ChangeName { handle, .. }
            | Command::Plug { handle, .. }
            | Command::RemovePlayed { handle }
            | Command::PlugPlayed { handle }
            | Command::PlugLog { handle, .. } => Some(handle),
            Command::Remove { needle, .. } | Command::RemoveLog { needle } => Some(needle),
            _ => None,
        }
    }
}

/// Splits `[!]verb rest` and resolves the verb. `None` for blank lines.
pub fn split_verb(line: &str) -> Option<(Result<Verb, UnknownVerb>, &str)> {
    let line = line.trim_start();
    let line = line.strip_prefix('!').unwrap_or(line);
    let (verb, args) = match line.find(char::is_whitespace) {
        Some(at) => (&line[..at], &line[at..]),
        None => (line, ""),
    };
    if verb.is_empty() {
        return None;
    }
    Some((verb.parse(), args))
}

fn head<'a, 'b>(tokens: &'b [&'a str]) -> Result<(String, &'b [&'a str]), EngineError> {
    match tokens.split_first() {
        Some((first, tail)) => Ok(((*first).to_string(), tail)),
        None => Err(EngineError::invalid("missing handle")),
    }
}

fn rest(tokens: &[&str], what: &str) -> Result<String, EngineError> {
    if tokens.is_empty() {
        return Err(EngineError::invalid(format!("missing {what}")));
    }
    Ok(tokens.join(" "))
}

fn split_position<'a, 'b>(
    tokens: &'b [&'a str],
) -> Result<(&'b [&'a str], Option<usize>), EngineError> {
    let Some((last, names)) = tokens.split_last() else {
        return Ok((tokens, None));
    };
    if names.is_empty() {
        return Ok((tokens, None));
    }
    match last.parse::<i64>() {
        Ok(n) if n < 0 => Err(EngineError::invalid(format!("position {n} is negative"))),
        Ok(n) => Ok((names, Some(usize::try_from(n).unwrap_or(usize::MAX)))),
        Err(_) => Ok((tokens, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, EngineError> {
        let (verb, args) = split_verb(line).unwrap();
        Command::parse(verb.unwrap(), args)
    }

    #[test]
    fn test_verb_is_case_insensitive_with_optional_bang() {
        assert_eq!(split_verb("!JOIN Al").unwrap().0, Ok(Verb::Join));
        assert_eq!(split_verb("next").unwrap().0, Ok(Verb::Next));
        assert_eq!(
            split_verb("!dance").unwrap().0,
            Err(UnknownVerb("dance".into()))
        );
        assert!(split_verb("   ").is_none());
        assert!(split_verb("!").is_none());
    }

    #[test]
    fn test_join_keeps_case_and_collapses_spaces() {
        assert_eq!(
            parse("!join  Big   Al ").unwrap(),
            Command::Join {
                name: "Big Al".into()
            }
        );
        assert_eq!(
            parse("!join").unwrap(),
            Command::Join {
                name: String::new()
            }
        );
    }

    #[test]
    fn test_plug_trailing_position() {
        assert_eq!(
            parse("!plug bob Bo Jr 2").unwrap(),
            Command::Plug {
                list: ListKind::Main,
                handle: "bob".into(),
                name: "Bo Jr".into(),
                position: Some(2),
            }
        );
        assert_eq!(
            parse("!plugsub bob Bo").unwrap(),
            Command::Plug {
                list: ListKind::Subs,
                handle: "bob".into(),
                name: "Bo".into(),
                position: None,
            }
        );
    }

    #[test]
    fn test_lone_number_is_a_name() {
        assert_eq!(
            parse("!plug bob 42").unwrap(),
            Command::Plug {
                list: ListKind::Main,
                handle: "bob".into(),
                name: "42".into(),
                position: None,
            }
        );
    }

    #[test]
    fn test_negative_position_is_rejected() {
        assert!(matches!(
            parse("!plug bob Bo -1").unwrap_err(),
            EngineError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_plug_requires_handle_and_name() {
        assert!(parse("!plug").is_err());
        assert!(parse("!plug bob").is_err());
    }

    #[test]
    fn test_privileges() {
        assert!(!Verb::Join.is_privileged());
        assert!(!Verb::AmIFree.is_privileged());
        assert!(Verb::Next.is_privileged());
        assert!(Verb::FillSubs.is_privileged());
        assert!(Verb::ShowLog.is_privileged());
    }

    #[test]
    fn test_subject() {
        assert_eq!(parse("!remove Bo Jr").unwrap().subject(), Some("Bo Jr"));
        assert_eq!(parse("!next").unwrap().subject(), None);
    }
}
