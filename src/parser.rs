// parser.rs

/// A tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub argv: Vec<String>,
    pub background: bool,
}

impl Command {
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// Splits on whitespace and strips a trailing `&`, either as its own token
/// or glued to the end of the last word.
pub fn tokenize(line: &str) -> Command {
    let mut argv: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    let mut background = false;
    if let Some(last) = argv.last_mut() {
        if let Some(stripped) = last.strip_suffix('&') {
            background = true;
            if stripped.is_empty() {
                argv.pop();
            } else {
                *last = stripped.to_string();
            }
        }
    }
    Command { argv, background }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    Event(i64),
    Malformed,
}

/// Recognizes `!N` as the first word of `line`. Anything after it is ignored.
pub fn parse_recall(line: &str) -> Option<Recall> {
    let first = line.split_whitespace().next()?;
    let target = first.strip_prefix('!')?;
    Some(match target.parse::<i64>() {
        Ok(id) => Recall::Event(id),
        Err(_) => Recall::Malformed,
    })
}
