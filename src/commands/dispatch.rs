use tracing::{debug, warn};

use crate::core::{Engine, Outcome, Requester};
use crate::error::EngineError;
use crate::queue::ListKind;

use super::parse::{Command, UnknownVerb, split_verb};
use super::render::{self, Reply};

/// Parses `line`, runs it against `engine` and renders the reply.
///
/// Moderator verbs from non-moderators are dropped before their arguments are
/// looked at, so a malformed moderator command never answers a viewer.
pub fn dispatch(engine: &mut Engine, requester: &Requester, line: &str) -> Reply {
    let Some((verb, args)) = split_verb(line) else {
        return Reply::silent();
    };
    let verb = match verb {
        Ok(verb) => verb,
        Err(UnknownVerb(verb)) => {
            debug!(%verb, handle = %requester.handle, "ignoring unknown verb");
            return Reply::silent();
        }
    };
    if verb.is_privileged() && !requester.is_moderator {
        debug!(%verb, handle = %requester.handle, "ignoring moderator verb");
        return Reply::silent();
    }

    let verbose = engine.toggles().verbose;
    let command = match Command::parse(verb, args) {
        Ok(command) => command,
        Err(err) => return render::error(requester, verb, None, &err, verbose),
    };

    match execute(engine, requester, &command) {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                warn!(%verb, label = warning.as_label(), "{}", warning.as_message());
            }
            render::outcome(requester, &outcome)
        }
        Err(err) => {
            debug!(%verb, label = err.as_label(), "command failed");
            render::error(requester, verb, command.subject(), &err, verbose)
        }
    }
}

/// Runs an already parsed command.
pub fn execute(
    engine: &mut Engine,
    requester: &Requester,
    command: &Command,
) -> Result<Outcome, EngineError> {
    match command {
        Command::Join { name } => engine.join(requester, name),
        Command::Drop => engine.drop(requester),
        Command::Rename { name } => engine.rename(requester, name),
        Command::ChangeName { handle, name } => engine.change_name(requester, handle, name),
        Command::Plug {
            list,
            handle,
            name,
            position,
        } => match list {
            ListKind::Main => engine.plug(requester, handle, name, *position),
            ListKind::Subs => engine.plug_sub(requester, handle, name, *position),
        },
        Command::Remove { list, needle } => match list {
            ListKind::Main => engine.remove(requester, needle),
            ListKind::Subs => engine.remove_sub(requester, needle),
        },
        Command::ClearQueue => engine.clear_queue(requester),
        Command::ClearSubs => engine.clear_subs(requester),
        Command::Next => engine.next(requester),
        Command::Toggle { name } => engine.toggle(requester, name),
        Command::Queue => Ok(engine.queue()),
        Command::ShowSubs => Ok(engine.show_subs()),
        Command::PlayedList => Ok(engine.played_list()),
        Command::AmIFree => engine.am_i_free(requester),
        Command::RemovePlayed { handle } => engine.remove_played(requester, handle),
        Command::ClearPlayed => engine.clear_played(requester),
        Command::PlugPlayed { handle } => engine.plug_played(requester, handle),
        Command::OptIn { name } => engine.opt_in(requester, name),
        Command::OptOut => engine.opt_out(requester),
        Command::PlugLog { handle, name } => engine.plug_log(requester, handle, name),
        Command::RemoveLog { needle } => engine.remove_log(requester, needle),
        Command::ShowLog => engine.show_log(requester),
        Command::Fill { list } => engine.restore(requester, *list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, EngineBuilder};

    fn engine() -> Engine {
        let mut cfg = Config::default();
        cfg.toggles.open = true;
        EngineBuilder::new(cfg).build().unwrap()
    }

    fn text(reply: Reply) -> String {
        reply.text.unwrap_or_default()
    }

    #[test]
    fn test_viewer_moderator_verbs_are_silent_even_when_malformed() {
        let mut engine = engine();
        let viewer = Requester::viewer("eve");
        assert!(dispatch(&mut engine, &viewer, "!next").is_silent());
        assert!(dispatch(&mut engine, &viewer, "!plug").is_silent());
        assert!(dispatch(&mut engine, &viewer, "!toggle open").is_silent());
        assert!(engine.toggles().open);
    }

    #[test]
    fn test_unknown_and_blank_lines_are_silent() {
        let mut engine = engine();
        let viewer = Requester::viewer("eve");
        assert!(dispatch(&mut engine, &viewer, "!dance").is_silent());
        assert!(dispatch(&mut engine, &viewer, "").is_silent());
    }

    #[test]
    fn test_join_then_next_replies() {
        let mut engine = engine();
        let m = Requester::moderator("mod");
        assert_eq!(
            text(dispatch(&mut engine, &Requester::viewer("alice"), "!join Al")),
            "@alice I've added you to the list! Your in game name is Al"
        );
        assert_eq!(
            text(dispatch(&mut engine, &Requester::viewer("alice"), "!join Al")),
            "@alice you're already in the queue"
        );
        assert_eq!(
            text(dispatch(&mut engine, &m, "!next")),
            "Al is done. No one else in line!"
        );
        assert!(dispatch(&mut engine, &m, "!next").is_silent(), "cooldown is silent");
    }

    #[test]
    fn test_plug_reports_effective_position() {
        let mut engine = engine();
        let m = Requester::moderator("mod");
        dispatch(&mut engine, &Requester::viewer("alice"), "!join Al");
        assert_eq!(
            text(dispatch(&mut engine, &m, "!plug bob Bo 0")),
            "Bo has been added to the queue at position 0"
        );
        assert_eq!(
            text(dispatch(&mut engine, &m, "!plug bob Bo")),
            "bob is already in the queue"
        );
    }

    #[test]
    fn test_missing_argument_shows_usage() {
        let mut engine = engine();
        assert_eq!(
            text(dispatch(&mut engine, &Requester::viewer("alice"), "!join")),
            "@alice missing in-game name. It's [!join in_game_name] without the [ ]"
        );
    }
}
