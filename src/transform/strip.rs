//! Comment and whitespace stripping for PHP source
//!
//! The stripper is a small lexer, not a parser. Inside PHP code it drops
//! comments and collapses every run of whitespace (and comments) into one
//! space. String literals, heredoc/nowdoc bodies, and inline markup outside
//! the PHP tags are copied verbatim. The open tag keeps the single
//! whitespace character that follows it and the close tag keeps one trailing
//! newline, the way the PHP tokenizer attaches them to the tags.

/// Strip comments and insignificant whitespace from PHP source text.
pub fn strip_whitespace(source: &str) -> String {
    Stripper::new(source).run()
}

struct Stripper {
    chars: Vec<char>,
    pos: usize,
    out: String,
    pending_space: bool,
}

impl Stripper {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            out: String::with_capacity(source.len()),
            pending_space: false,
        }
    }

    fn run(mut self) -> String {
        while self.pos < self.chars.len() {
            self.inline_markup();
            if self.pos < self.chars.len() {
                self.php_code();
            }
        }
        self.out
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, needle: &str) -> bool {
        needle
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn starts_with_ignore_case(&self, needle: &str) -> bool {
        needle
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn copy(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(c) = self.peek(0) {
                self.out.push(c);
                self.pos += 1;
            }
        }
    }

    fn flush_space(&mut self) {
        if self.pending_space {
            if !self.out.ends_with(char::is_whitespace) && !self.out.is_empty() {
                self.out.push(' ');
            }
            self.pending_space = false;
        }
    }

    /// Copy markup verbatim up to and including the next open tag.
    fn inline_markup(&mut self) {
        while self.pos < self.chars.len() {
            if self.starts_with_ignore_case("<?php") {
                self.copy(5);
                if self.peek(0).is_some_and(char::is_whitespace) {
                    self.open_tag_whitespace();
                }
                return;
            }
            if self.starts_with("<?=") {
                self.copy(3);
                return;
            }
            self.copy(1);
        }
    }

    fn open_tag_whitespace(&mut self) {
        if self.starts_with("\r\n") {
            self.copy(2);
        } else {
            self.copy(1);
        }
    }

    /// Process PHP code until a close tag (consumed) or end of input.
    fn php_code(&mut self) {
        self.pending_space = false;
        while let Some(c) = self.peek(0) {
            match c {
                _ if c.is_whitespace() => {
                    self.pending_space = true;
                    self.pos += 1;
                }
                '?' if self.peek(1) == Some('>') => {
                    self.flush_space();
                    self.copy(2);
                    if self.starts_with("\r\n") {
                        self.copy(2);
                    } else if self.peek(0) == Some('\n') {
                        self.copy(1);
                    }
                    return;
                }
                '#' if self.peek(1) != Some('[') => self.line_comment(),
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.block_comment(),
                '\'' | '"' | '`' => {
                    self.flush_space();
                    self.quoted(c);
                }
                '<' if self.starts_with("<<<") => {
                    self.flush_space();
                    self.heredoc();
                }
                _ => {
                    self.flush_space();
                    self.copy(1);
                }
            }
        }
    }

    /// A line comment ends at the newline or right before a close tag.
    fn line_comment(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' || (c == '?' && self.peek(1) == Some('>')) {
                break;
            }
            self.pos += 1;
        }
        self.pending_space = true;
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.starts_with("*/") {
                self.pos += 2;
                break;
            }
            self.pos += 1;
        }
        self.pending_space = true;
    }

    fn quoted(&mut self, quote: char) {
        self.copy(1);
        while let Some(c) = self.peek(0) {
            if c == '\\' {
                self.copy(2);
                continue;
            }
            self.copy(1);
            if c == quote {
                break;
            }
        }
    }

    /// Copy a heredoc or nowdoc verbatim, including its closing identifier.
    fn heredoc(&mut self) {
        let start = self.pos;
        let out_len = self.out.len();
        self.copy(3);
        while self.peek(0).is_some_and(|c| c == ' ' || c == '\t') {
            self.copy(1);
        }
        let quoted = matches!(self.peek(0), Some('\'') | Some('"'));
        if quoted {
            self.copy(1);
        }

        let mut label = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || c == '_' {
                label.push(c);
                self.copy(1);
            } else {
                break;
            }
        }

        if label.is_empty() {
            // `<<<` without a label is not a heredoc.
            self.out.truncate(out_len);
            self.out.push_str("<<<");
            self.pos = start + 3;
            return;
        }
        if quoted {
            self.copy(1);
        }

        // Body: copy whole lines until one starts (after indentation) with the label.
        loop {
            if !self.copy_line() {
                return;
            }
            let indent = (0..)
                .take_while(|&i| matches!(self.peek(i), Some(' ') | Some('\t')))
                .count();
            let closes = label
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek(indent + i) == Some(c))
                && !self
                    .peek(indent + label.chars().count())
                    .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if closes {
                self.copy(indent + label.chars().count());
                return;
            }
        }
    }

    /// Copy through the next newline. Returns false at end of input.
    fn copy_line(&mut self) -> bool {
        while let Some(c) = self.peek(0) {
            self.copy(1);
            if c == '\n' {
                return true;
            }
        }
        false
    }
}
