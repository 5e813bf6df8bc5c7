//! Token and argument extraction for text commands and interaction ids

/// Separator between the token and arguments in an interaction custom id
pub const CUSTOM_ID_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub token: String,
    pub args: Vec<String>,
}

/// Parse `<prefix><token> <args...>`
///
/// Returns `None` when the text does not start with `prefix` or nothing
/// follows it.
pub fn parse_text(content: &str, prefix: &str) -> Option<ParsedInput> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    // "! ping" is not a command
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut parts = rest.split_whitespace();
    let token = parts.next()?.to_string();
    Some(ParsedInput {
        token,
        args: parts.map(str::to_string).collect(),
    })
}

/// Parse an interaction custom id of the form `token[:arg[:arg...]]`
pub fn parse_custom_id(custom_id: &str) -> Option<ParsedInput> {
    let mut parts = custom_id.split(CUSTOM_ID_SEPARATOR);
    let token = parts.next()?.trim();
    if token.is_empty() {
        return None;
    }

    Some(ParsedInput {
        token: token.to_string(),
        args: parts
            .filter(|arg| !arg.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Build a custom id the way `parse_custom_id` reads it back
pub fn custom_id(token: &str, args: &[&str]) -> String {
    std::iter::once(token)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(&CUSTOM_ID_SEPARATOR.to_string())
}
