//! Nesting-Aware Scanning
//!
//! One scanner shared by every call site that needs to split or search a
//! signature at the top level: property lists (`;`), generic parameter lists
//! (`,`), unions (`|`) and intersections (`&`).
//!
//! Openers are `(`, `[`, `{`, `<`. A closer only closes the innermost open
//! group when it is that group's own closer; any other closer is a mismatch.
//! A `>` that completes an arrow (`=>`) is not a closer, and the contents of
//! string literals are opaque.

/// What one character did to the nesting state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Inside or delimiting a string literal
    Quoted,
    Opened,
    Closed,
    /// A closer that does not close the innermost open group
    Mismatched,
    Plain,
}

fn closer_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => '>',
    }
}

/// Stack of expected closers plus string-literal state
#[derive(Debug, Default)]
struct Nesting {
    expected: Vec<char>,
    quote: Option<char>,
    escaped: bool,
    prev: Option<char>,
}

impl Nesting {
    fn depth(&self) -> usize {
        self.expected.len()
    }

    fn step(&mut self, ch: char) -> Step {
        let step = match self.quote {
            Some(q) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == q {
                    self.quote = None;
                }
                Step::Quoted
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    self.quote = Some(ch);
                    Step::Quoted
                }
                '(' | '[' | '{' | '<' => {
                    self.expected.push(closer_for(ch));
                    Step::Opened
                }
                '>' if self.prev == Some('=') => Step::Plain,
                ')' | ']' | '}' | '>' => {
                    if self.expected.last() == Some(&ch) {
                        self.expected.pop();
                        Step::Closed
                    } else {
                        Step::Mismatched
                    }
                }
                _ => Step::Plain,
            },
        };
        self.prev = Some(ch);
        step
    }
}

/// Byte offsets of every top-level occurrence of `separator` in `input`.
///
/// Mismatched closers leave the depth unchanged; callers that need
/// well-formed input check [`is_balanced`] first.
fn top_level_positions(input: &str, separator: char) -> Vec<usize> {
    let mut nesting = Nesting::default();
    let mut positions = Vec::new();

    for (idx, ch) in input.char_indices() {
        if nesting.step(ch) == Step::Plain && ch == separator && nesting.depth() == 0 {
            positions.push(idx);
        }
    }

    positions
}

/// Split `input` on `separator`, ignoring separators nested inside
/// brackets, braces, parentheses, angle brackets or string literals.
///
/// Segments are returned untrimmed; an input without any top-level
/// separator yields a single segment.
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(input, separator) {
        segments.push(&input[start..pos]);
        start = pos + separator.len_utf8();
    }
    segments.push(&input[start..]);
    segments
}

/// Whether `separator` occurs anywhere in `input` outside nested groups
pub fn contains_top_level(input: &str, separator: char) -> bool {
    !top_level_positions(input, separator).is_empty()
}

/// Whether every group in `input` is closed by its own closer and every
/// string literal is terminated
pub fn is_balanced(input: &str) -> bool {
    let mut nesting = Nesting::default();
    for ch in input.chars() {
        if nesting.step(ch) == Step::Mismatched {
            return false;
        }
    }
    nesting.depth() == 0 && nesting.quote.is_none()
}

/// Byte offset of the closer that matches the opener at byte `open`.
///
/// Returns `None` when `open` is not an opener, the group never closes, or
/// a closer of the wrong kind turns up first.
pub fn matching_close(input: &str, open: usize) -> Option<usize> {
    let opener = input[open..].chars().next()?;
    if !matches!(opener, '(' | '[' | '{' | '<') {
        return None;
    }

    let mut nesting = Nesting::default();
    for (offset, ch) in input[open..].char_indices() {
        match nesting.step(ch) {
            Step::Mismatched => return None,
            Step::Closed if nesting.depth() == 0 => return Some(open + offset),
            _ => {}
        }
    }

    None
}

/// Whether the whole of `input` is one group opened by its first character
/// and closed by its last (`{...}`, `(...)`, `<...>`).
pub fn is_wrapped(input: &str, opener: char) -> bool {
    input.starts_with(opener) && matching_close(input, 0) == Some(input.len() - 1)
}

// =============================================================================
// Tests
// =============================================================================
