use crate::core::{Command, Key, KvError, Request, Result};

/// A parsed operation log: the worker count header plus one request per
/// non-blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLog {
    pub workers: usize,
    pub requests: Vec<Request>,
}

fn parse_key(raw: &str) -> Result<Key> {
    raw.parse::<Key>()
        .map_err(|_| KvError::ParseError(format!("invalid key '{}'", raw)))
}

/// Split `<verb> <rest>`; the verb must be a single character.
fn split_verb(line: &str) -> Result<(char, &str)> {
    let mut chars = line.chars();
    let verb = chars
        .next()
        .ok_or_else(|| KvError::ParseError("empty line".to_string()))?;
    let rest = chars.as_str();
    match rest.strip_prefix(' ') {
        Some(rest) => Ok((verb, rest)),
        None if rest.is_empty() => Err(KvError::ParseError(format!(
            "operation '{}' is missing a key",
            verb
        ))),
        None => Err(KvError::ParseError(format!(
            "unknown operation '{}'",
            line.split_whitespace().next().unwrap_or(line)
        ))),
    }
}

/// Parse one operation line: `I <key> "<value>"`, `L <key>` or `D <key>`.
///
/// The insert value is everything between the quote that follows the key
/// and the last character of the line, which must also be a quote. Quotes
/// inside the value are kept as-is.
pub fn parse_line(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = split_verb(line)?;

    match verb {
        'I' => {
            let (key, value) = rest.split_once(' ').ok_or_else(|| {
                KvError::ParseError("insert requires a quoted value".to_string())
            })?;
            let key = parse_key(key)?;
            let value = value
                .strip_prefix('"')
                .and_then(|value| value.strip_suffix('"'))
                .ok_or_else(|| {
                    KvError::ParseError(format!("value {} is not enclosed in quotes", value))
                })?;
            Ok(Command::insert(key, value))
        }
        'L' => Ok(Command::lookup(parse_key(rest)?)),
        'D' => Ok(Command::delete(parse_key(rest)?)),
        other => Err(KvError::ParseError(format!("unknown operation '{}'", other))),
    }
}

/// Like [`parse_line`] but keeps a failure as a `Malformed` request so it
/// still gets a result line at its position.
pub fn parse_request(line: &str) -> Request {
    match parse_line(line) {
        Ok(command) => Request::Command(command),
        Err(err) => Request::Malformed {
            line: line.trim().to_string(),
            reason: match err {
                KvError::ParseError(reason) => reason,
                other => other.to_string(),
            },
        },
    }
}

/// Parse the `N <count>` header line.
pub fn parse_header(line: &str) -> Result<usize> {
    let line = line.trim();
    let count = line
        .strip_prefix("N ")
        .ok_or_else(|| KvError::ParseError(format!("expected 'N <count>' header, got '{}'", line)))?;
    let workers = count
        .trim()
        .parse::<usize>()
        .map_err(|_| KvError::ParseError(format!("invalid worker count '{}'", count)))?;
    if workers == 0 {
        return Err(KvError::ParseError("worker count must be > 0".to_string()));
    }
    Ok(workers)
}

/// Parse a whole operation log. Blank lines are skipped; a missing or
/// invalid header fails the log, malformed operation lines do not.
pub fn parse_log(input: &str) -> Result<OperationLog> {
    let mut lines = input.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| KvError::ParseError("missing 'N <count>' header".to_string()))?;
    let workers = parse_header(header)?;
    let requests = lines.map(parse_request).collect();

    Ok(OperationLog { workers, requests })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        assert_eq!(
            parse_line("I 42 \"hello world\"").unwrap(),
            Command::insert(42, "hello world")
        );
        assert_eq!(parse_line("I -7 \"\"").unwrap(), Command::insert(-7, ""));
    }

    #[test]
    fn test_parse_insert_keeps_inner_quotes() {
        assert_eq!(
            parse_line("I 1 \"say \"hi\"\"").unwrap(),
            Command::insert(1, "say \"hi\"")
        );
    }

    #[test]
    fn test_parse_lookup_and_delete() {
        assert_eq!(parse_line("L 10").unwrap(), Command::lookup(10));
        assert_eq!(parse_line("D 3\r").unwrap(), Command::delete(3));
    }

    #[test]
    fn test_parse_errors() {
        for line in [
            "",
            "X 1",
            "L",
            "L abc",
            "Lookup 1",
            "I 1",
            "I 1 value",
            "I 1 \"open",
            "I x \"v\"",
            "D 1 2",
        ] {
            assert!(
                matches!(parse_line(line), Err(KvError::ParseError(_))),
                "expected parse error for {:?}",
                line
            );
        }
    }

    #[test]
    fn test_parse_request_keeps_malformed() {
        match parse_request("Q 1") {
            Request::Malformed { line, reason } => {
                assert_eq!(line, "Q 1");
                assert!(reason.contains("unknown operation"));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header("N 4").unwrap(), 4);
        assert!(parse_header("N 0").is_err());
        assert!(parse_header("N x").is_err());
        assert!(parse_header("I 1 \"a\"").is_err());
    }

    #[test]
    fn test_parse_log() {
        let log = parse_log("N 2\nI 1 \"a\"\n\nL 1\nbogus\nD 1\n").unwrap();
        assert_eq!(log.workers, 2);
        assert_eq!(log.requests.len(), 4);
        assert_eq!(log.requests[0], Request::Command(Command::insert(1, "a")));
        assert!(matches!(log.requests[2], Request::Malformed { .. }));
    }

    #[test]
    fn test_parse_log_requires_header() {
        assert!(parse_log("").is_err());
        assert!(parse_log("L 1\n").is_err());
    }
}
