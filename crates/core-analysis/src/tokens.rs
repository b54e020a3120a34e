//! Keyword tokenizer.
//!
//! A line is split into identifier runs (alphanumeric or `_`) and single
//! punctuation characters; whitespace only separates. Keyword matching
//! compares whole tokens, so `for` matches in `for (`, `} for x` and at line
//! start or end, but never inside `xfor` or `for_each`. Keywords made of
//! several tokens (`=>`) match a consecutive token run.

/// One token with its character offset in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl Token<'_> {
    /// Character offset one past the token.
    pub fn end(&self) -> usize {
        self.start + self.text.chars().count()
    }

    fn is_glued_to(&self, next: &Token<'_>) -> bool {
        self.end() == next.start
    }
}

fn is_ident(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Iterator over the tokens of a line.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    byte: usize,
    chars_seen: usize,
}

pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        byte: 0,
        chars_seen: 0,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let rest = &text[self.byte..];
        let mut iter = rest.char_indices().peekable();
        // skip whitespace
        while let Some(&(_, c)) = iter.peek() {
            if !c.is_whitespace() {
                break;
            }
            iter.next();
            self.chars_seen += 1;
        }
        let (start_byte, first) = iter.next()?;
        let start = self.chars_seen;
        let mut end_byte = start_byte + first.len_utf8();
        let mut count = 1;
        if is_ident(first) {
            while let Some(&(i, c)) = iter.peek() {
                if !is_ident(c) {
                    break;
                }
                end_byte = i + c.len_utf8();
                count += 1;
                iter.next();
            }
        }
        let token = Token {
            text: &rest[start_byte..end_byte],
            start,
        };
        self.byte += end_byte;
        self.chars_seen += count;
        Some(token)
    }
}

/// First keyword from `keywords` that appears as a standalone token run in `text`.
pub fn find_keyword<I>(text: &str, keywords: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let line: Vec<Token<'_>> = tokens(text).collect();
    if line.is_empty() {
        return None;
    }
    keywords.into_iter().find(|keyword| {
        let pattern: Vec<Token<'_>> = tokens(keyword.as_ref()).collect();
        !pattern.is_empty()
            && line
                .windows(pattern.len())
                .any(|w| same_run(w, &pattern))
    })
}

/// Same token texts, and glued together exactly where the keyword's tokens are.
fn same_run(window: &[Token<'_>], pattern: &[Token<'_>]) -> bool {
    window.iter().zip(pattern).all(|(a, b)| a.text == b.text)
        && window
            .windows(2)
            .zip(pattern.windows(2))
            .all(|(w, p)| w[0].is_glued_to(&w[1]) == p[0].is_glued_to(&p[1]))
}

pub fn contains_keyword<I>(text: &str, keywords: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    find_keyword(text, keywords).is_some()
}
