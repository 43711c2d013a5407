//! Comment stripping, whitespace normalization, and tokenization of a raw
//! configuration file into a flat token stream.

use crate::error::ConfigParseError;

/// Removes every `#`-to-end-of-line comment from `content`.
pub fn remove_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        match rest.find('#') {
            Some(pos) => {
                result.push_str(&rest[..pos]);
                match rest[pos..].find('\n') {
                    Some(nl) => rest = &rest[pos + nl..],
                    None => {
                        rest = "";
                        break;
                    }
                }
            }
            None => {
                result.push_str(rest);
                break;
            }
        }
    }
    result
}

/// Collapses every maximal run of whitespace (including newlines) to a
/// single space, and trims both ends.
pub fn normalise_spaces(content: &str) -> String {
    let trimmed = content.trim();
    let mut result = String::with_capacity(trimmed.len());
    let mut prev_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }
    result
}

/// Splits the normalized text on `' '` into an ordered token stream.
/// Since `normalise_spaces` has already collapsed every run of whitespace
/// to a single space, splitting on that one separator is equivalent to the
/// original's `splitStrToVect(content, " \n\t")`.
pub fn tokenize(normalised: &str) -> Vec<String> {
    normalised
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Runs comment stripping, whitespace normalization, and tokenization in
/// sequence over raw config text.
pub fn normalise_and_tokenize(raw: &str) -> Result<String, ConfigParseError> {
    let no_comments = remove_comments(raw);
    Ok(normalise_spaces(&no_comments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comment_to_end_of_line() {
        let input = "root /tmp; # a comment\nindex i.html;";
        let out = remove_comments(input);
        assert_eq!(out, "root /tmp; \nindex i.html;");
    }

    #[test]
    fn strips_trailing_comment_with_no_newline() {
        let input = "root /tmp; # dangling";
        assert_eq!(remove_comments(input), "root /tmp; ");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let input = "  root   /tmp;\n\tindex  i.html;  ";
        assert_eq!(normalise_spaces(input), "root /tmp; index i.html;");
    }

    #[test]
    fn tokenize_round_trip_is_stable() {
        let input = "server { listen 127.0.0.1:8080; }";
        let normalised = normalise_spaces(input);
        let tokens = tokenize(&normalised);
        let reconstructed = tokens.join(" ");
        let retokenised = tokenize(&normalise_spaces(&reconstructed));
        assert_eq!(tokens, retokenised);
    }
}
