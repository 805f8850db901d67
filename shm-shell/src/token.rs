//! Split a command line into tokens.
//!
//! Tokens are separated by spaces, tabs and line breaks. A `"` or `'` inside a token extends it
//! up to the next quote of the same kind, or to the end of the line if there is none. Quotes
//! wrapping a whole token are removed, any other quote is kept as written.

const DELIMITERS: &[u8] = b" \t\r\n";

/// Iterator over the tokens of a line.
pub struct Tokens<'a> {
    line: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Tokens { line, index: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let line = self.line;
        let bytes = line.as_bytes();

        while self.index < bytes.len() && DELIMITERS.contains(&bytes[self.index]) {
            self.index += 1;
        }

        if self.index >= bytes.len() {
            return None;
        }

        let begin = self.index;
        while let Some(&c) = bytes.get(self.index) {
            if DELIMITERS.contains(&c) {
                break;
            }

            self.index = match c {
                b'"' | b'\'' => bytes[self.index + 1..]
                    .iter()
                    .position(|&b| b == c)
                    .map_or(bytes.len(), |pair| self.index + pair + 2),
                _ => self.index + 1,
            };
        }

        // All positions we stop at are ASCII or the end, so this slices on char boundaries.
        Some(unquote(&line[begin..self.index]))
    }
}

/// Tokenize a whole line.
pub fn split(line: &str) -> Vec<String> {
    Tokens::new(line).map(str::to_owned).collect()
}

fn unquote(token: &str) -> &str {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return &token[1..token.len() - 1];
        }
    }

    token
}
