use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::repl::commands::{command_flags, COMMAND_NAMES};

#[derive(Default)]
pub struct ReplHelper;

impl Helper for ReplHelper {}
impl Validator for ReplHelper {}
impl Highlighter for ReplHelper {}

/// Remaining characters of the first command name extending `line`.
fn command_hint(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') || trimmed.contains(' ') {
        return None;
    }
    COMMAND_NAMES
        .iter()
        .find(|name| name.starts_with(trimmed) && **name != trimmed)
        .map(|name| name[trimmed.len()..].to_string())
}

/// Completion start offset and candidates for the text before the cursor.
fn candidates(prefix: &str) -> (usize, Vec<&'static str>) {
    let trimmed = prefix.trim_start();
    if !trimmed.starts_with('/') {
        return (0, vec![]);
    }

    // Past the command name: complete the current flag or keyword.
    if let Some(space_idx) = trimmed.find(' ') {
        let cmd = &trimmed[..space_idx];
        let word = trimmed.rsplit(' ').next().unwrap_or("");
        let start = prefix.len() - word.len();
        let matches = command_flags(cmd).iter().copied().filter(|f| f.starts_with(word)).collect();
        return (start, matches);
    }

    let start = prefix.len() - trimmed.len();
    let matches = COMMAND_NAMES.iter().copied().filter(|name| name.starts_with(trimmed)).collect();
    (start, matches)
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        command_hint(line)
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|m| Pair { display: m.to_string(), replacement: m.to_string() })
            .collect();
        Ok((start, pairs))
    }
}
