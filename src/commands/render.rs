//! Reply rendering: one chat line per command, or nothing.
//!
//! Silence is a valid answer. Nothing is said for
//! - non-moderators using moderator verbs,
//! - `next` during its cooldown,
//! - capacity and subscriber denials while `verbose` is off,
//! - unknown verbs.
//!
//! Persistence warnings are logged, never rendered.

use std::fmt::Write as _;

use crate::core::{Availability, Notice, Outcome, Requester};
use crate::error::{Denial, EngineError};
use crate::ledger::{DATE_FORMAT, LedgerRecord};
use crate::queue::{Entrant, Entry, ListKind, normalize_handle};

use super::parse::Verb;

/// What to send back to the channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: Option<String>,
}

impl Reply {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn say(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.text.is_none()
    }
}

/// Renders a successful outcome.
pub fn outcome(requester: &Requester, outcome: &Outcome) -> Reply {
    let who = &requester.handle;
    let text = match &outcome.notice {
        Notice::Joined { entrant, .. } => format!(
            "@{who} I've added you to the list! Your in game name is {}",
            entrant.display_name()
        ),
        Notice::Dropped { .. } => format!("@{who} you have dropped from the list"),
        Notice::Renamed { entrant, .. } if entrant.handle() == normalize_handle(&requester.handle) => {
            format!(
                "@{who} your in game name is now {}",
                entrant.display_name()
            )
        }
        Notice::Renamed { entrant, .. } => format!(
            "@{who} I've changed @{}'s in game name to {}",
            entrant.handle(),
            entrant.display_name()
        ),
        Notice::Plugged {
            entrant,
            list,
            position: None,
        } => format!(
            "{} has been added to the {} at the back",
            entrant.display_name(),
            list_name(*list)
        ),
        Notice::Plugged {
            entrant,
            list,
            position: Some(at),
        } => format!(
            "{} has been added to the {} at position {at}",
            entrant.display_name(),
            list_name(*list)
        ),
        Notice::Removed { entrant, from } => format!(
            "{} has been removed from the {}.",
            entrant.display_name(),
            list_name(*from)
        ),
        Notice::Cleared {
            list: ListKind::Main,
        } => format!("@{who} the player queue has been cleared"),
        Notice::Cleared {
            list: ListKind::Subs,
        } => format!("@{who} the sub list has been cleared"),
        Notice::Advanced {
            done,
            next_up: Some(next),
        } => format!(
            "{} is done. {} is up next! @{} you're on, pls join the room",
            done.display_name(),
            next.display_name(),
            next.handle()
        ),
        Notice::Advanced {
            done,
            next_up: None,
        } => format!("{} is done. No one else in line!", done.display_name()),
        Notice::NoOneInLine => "No one's in line!".to_string(),
        Notice::Toggled { toggles, .. } => {
            format!("@{who} here are the states of your toggles: {toggles}")
        }
        Notice::Queue(entries) => queue_line(entries),
        Notice::Subs(subs) => names_line("Subs", "The sub list is empty.", subs),
        Notice::Played(handles) if handles.is_empty() => "No one has played yet.".to_string(),
        Notice::Played(handles) => format!("Played: {}", handles.join(", ")),
        Notice::Availability { availability, .. } => match availability {
            Availability::Free => format!("@{who} all clear! Go for it!!"),
            Availability::PlayedRecently => format!(
                "@{who} you have played recently or just now. In either case, give others a chance pls."
            ),
            Availability::PlayedThisSession => {
                format!("@{who} you have played today already. Give others a chance pls.")
            }
        },
        Notice::PlayedAdded { handle } => format!("{handle} has been added to the played list"),
        Notice::PlayedRemoved { handle } => {
            format!("{handle} has been removed from the played list.")
        }
        Notice::PlayedCleared => format!("@{who} the played list has been cleared"),
        Notice::SubOffered { handle } => format!(
            "@{handle} you get priority as a new sub. Type !optin in_game_name or !optout depending on if you want in or not"
        ),
        Notice::OptedIn { .. } => format!("@{who} you've been registered in the new subs list!"),
        Notice::OptedOut { .. } => format!("@{who} you've opted out of the new sub list."),
        Notice::Logged(record) => format!("{} has been added to the full log", record.display_name),
        Notice::Unlogged(record) => {
            format!("{} has been removed from the full log", record.display_name)
        }
        Notice::Log(records) => log_line(records),
        Notice::Restored {
            list: ListKind::Main,
            count,
        } => format!("@{who} the queue has been restored ({count} added)"),
        Notice::Restored {
            list: ListKind::Subs,
            count,
        } => format!("@{who} the subs list has been restored ({count} added)"),
        Notice::Ignored => return Reply::silent(),
    };
    Reply::say(text)
}

/// Renders a failure of `verb`.
///
/// `subject` is the handle or needle the command named, if any.
pub fn error(
    requester: &Requester,
    verb: Verb,
    subject: Option<&str>,
    err: &EngineError,
    verbose: bool,
) -> Reply {
    let who = &requester.handle;
    let subject = subject.unwrap_or(who);
    let text = match err {
        EngineError::PermissionDenied | EngineError::RateLimited => return Reply::silent(),
        EngineError::Denied(denial) if !denial.is_announced(verbose) => return Reply::silent(),
        EngineError::Denied(denial) => denial_line(who, verb, subject, *denial),
        EngineError::NotFound { what } => match verb {
            Verb::Drop => format!("@{who} you aren't in the list"),
            Verb::Rename | Verb::ChangeName => {
                format!("@{who} I couldn't find this user in the queue")
            }
            Verb::Remove => format!("{what} isn't in the queue."),
            Verb::RemoveSub => format!("{what} isn't in the sublist."),
            Verb::RemovePlayed => format!("{what} isn't in the played list."),
            Verb::RemoveLog => format!("{what} isn't in the full log"),
            Verb::OptIn | Verb::OptOut => format!("@{who} you're not on the new sub list rn."),
            _ => format!("@{who} {what} not found"),
        },
        EngineError::InvalidArgument { reason } if verb.usage().is_empty() => {
            format!("@{who} {reason}")
        }
        EngineError::InvalidArgument { reason } => format!(
            "@{who} {reason}. It's [{}] without the [ ]",
            verb.usage()
        ),
        EngineError::AlreadyLogged { handle } => format!("{handle} is already in the full log"),
        EngineError::OperationFailed { .. } => {
            format!("@{who} something went wrong on my end, check the logs")
        }
    };
    Reply::say(text)
}

fn denial_line(who: &str, verb: Verb, subject: &str, denial: Denial) -> String {
    match denial {
        Denial::Closed => format!("@{who} the list is closed atm. Sorry!"),
        Denial::RecentlyPlayed => format!("@{who} you played recently. Sorry!"),
        Denial::AlreadyPlayedThisSession => format!("@{who} you already played today. Sorry!"),
        Denial::SubscribersOnly => format!("@{who} the list is subs only rn. Sorry!"),
        Denial::QueueFull => {
            format!("@{who} The list is full. Try joining when the next turn starts")
        }
        Denial::AlreadyQueued => match verb {
            Verb::Plug => format!("{subject} is already in the queue"),
            Verb::PlugSub => format!("{subject} is already in the sublist"),
            _ => format!("@{who} you're already in the queue"),
        },
    }
}

fn list_name(list: ListKind) -> &'static str {
    match list {
        ListKind::Main => "queue",
        ListKind::Subs => "sublist",
    }
}

fn queue_line(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "The queue is empty.".to_string();
    }
    let mut line = String::from("Queue:");
    for (i, entry) in entries.iter().enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        match entry {
            Entry::Participant(entrant) => {
                let _ = write!(line, "{sep}{}", entrant.display_name());
            }
            Entry::SubscriberMarker => {
                let _ = write!(line, "{sep}<subs>");
            }
        }
    }
    line
}

fn names_line(label: &str, empty: &str, entrants: &[Entrant]) -> String {
    if entrants.is_empty() {
        return empty.to_string();
    }
    let names: Vec<&str> = entrants.iter().map(Entrant::display_name).collect();
    format!("{label}: {}", names.join(", "))
}

fn log_line(records: &[LedgerRecord]) -> String {
    if records.is_empty() {
        return "The full log is empty.".to_string();
    }
    let items: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "{} ({}, {})",
                r.handle,
                r.display_name,
                r.played_on.format(DATE_FORMAT)
            )
        })
        .collect();
    format!("Log: {}", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Requester {
        Requester::viewer("alice")
    }

    #[test]
    fn test_muted_denials_are_silent_unless_verbose() {
        let full = EngineError::Denied(Denial::QueueFull);
        assert!(error(&alice(), Verb::Join, None, &full, false).is_silent());
        assert_eq!(
            error(&alice(), Verb::Join, None, &full, true).text.as_deref(),
            Some("@alice The list is full. Try joining when the next turn starts")
        );

        let closed = EngineError::Denied(Denial::Closed);
        assert_eq!(
            error(&alice(), Verb::Join, None, &closed, false).text.as_deref(),
            Some("@alice the list is closed atm. Sorry!")
        );
    }

    #[test]
    fn test_permission_and_cooldown_are_silent() {
        for err in [EngineError::PermissionDenied, EngineError::RateLimited] {
            assert!(error(&alice(), Verb::Next, None, &err, true).is_silent());
        }
    }

    #[test]
    fn test_advanced_lines() {
        let out = Outcome::new(Notice::Advanced {
            done: Entrant::new("alice", "Al"),
            next_up: None,
        });
        assert_eq!(
            outcome(&alice(), &out).text.as_deref(),
            Some("Al is done. No one else in line!")
        );
        assert_eq!(
            outcome(&alice(), &Outcome::new(Notice::NoOneInLine)).text.as_deref(),
            Some("No one's in line!")
        );
    }

    #[test]
    fn test_queue_line_shows_marker() {
        let entries = vec![
            Entry::Participant(Entrant::new("alice", "Al")),
            Entry::SubscriberMarker,
            Entry::Participant(Entrant::new("bob", "Bo")),
        ];
        assert_eq!(queue_line(&entries), "Queue: Al, <subs>, Bo");
        assert_eq!(queue_line(&[]), "The queue is empty.");
    }

    #[test]
    fn test_usage_on_invalid_argument() {
        let err = EngineError::invalid("missing in-game name");
        assert_eq!(
            error(&alice(), Verb::Join, None, &err, true).text.as_deref(),
            Some("@alice missing in-game name. It's [!join in_game_name] without the [ ]")
        );
    }

    #[test]
    fn test_ignored_is_silent() {
        assert!(outcome(&alice(), &Outcome::new(Notice::Ignored)).is_silent());
    }
}
