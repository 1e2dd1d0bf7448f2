//! Splitting an input line into chained sub-commands.
//!
//! A line such as `make && make install || echo failed; ls` becomes a list of
//! [`SubCommand`]s, each tagged with the operator that decides whether it runs.
//! Only `;`, `&&` and `||` are recognised. A single `&` or `|` is an ordinary
//! character and stays in the command text.

use crate::command::ExitCode;

/// The operator governing whether a sub-command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    /// First segment of a line; always runs.
    None,
    /// Preceded by `&&`: runs if the last status is zero.
    And,
    /// Preceded by `||`: runs if the last status is non-zero.
    Or,
    /// Preceded by `;`: always runs.
    Seq,
}

impl ChainOp {
    /// Decide whether a segment governed by `self` runs after `last_status`.
    pub fn should_run(self, last_status: ExitCode) -> bool {
        match self {
            ChainOp::None | ChainOp::Seq => true,
            ChainOp::And => last_status == 0,
            ChainOp::Or => last_status != 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainOp::None => "",
            ChainOp::And => "&&",
            ChainOp::Or => "||",
            ChainOp::Seq => ";",
        }
    }
}

/// One segment of a chained line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommand {
    /// Command text with surrounding whitespace trimmed. May be empty.
    pub text: String,
    /// The operator that preceded this segment.
    pub op: ChainOp,
}

/// Cut `line` at the first comment.
///
/// A `#` starts a comment only at the beginning of the line or right after a
/// space or tab.
pub fn strip_comment(line: &str) -> &str {
    let mut prev: Option<char> = None;
    for (i, c) in line.char_indices() {
        if c == '#' && matches!(prev, None | Some(' ') | Some('\t')) {
            return &line[..i];
        }
        prev = Some(c);
    }
    line
}

struct ChainSplitter<'a> {
    input: &'a str,
    pos: usize,
    segment_start: usize,
    pending_op: ChainOp,
    segments: Vec<SubCommand>,
}

impl<'a> ChainSplitter<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            segment_start: 0,
            pending_op: ChainOp::None,
            segments: Vec::new(),
        }
    }

    fn split(mut self) -> Vec<SubCommand> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            // two-character operators take precedence
            let op = match (bytes[self.pos], bytes.get(self.pos + 1)) {
                (b'&', Some(b'&')) => Some((ChainOp::And, 2)),
                (b'|', Some(b'|')) => Some((ChainOp::Or, 2)),
                (b';', _) => Some((ChainOp::Seq, 1)),
                _ => None,
            };
            match op {
                Some((op, width)) => {
                    self.emit(self.pos);
                    self.pos += width;
                    self.segment_start = self.pos;
                    self.pending_op = op;
                }
                None => self.pos += 1,
            }
        }
        self.emit(self.input.len());
        self.segments
    }

    fn emit(&mut self, end: usize) {
        self.segments.push(SubCommand {
            text: self.input[self.segment_start..end].trim().to_owned(),
            op: self.pending_op,
        });
    }
}

/// Split `line` into sub-commands after stripping comments.
///
/// The first segment carries [`ChainOp::None`]; every following segment
/// carries the operator that preceded it. An empty or comment-only line yields
/// an empty vector.
pub fn split_chain(line: &str) -> Vec<SubCommand> {
    let line = strip_comment(line);
    if line.trim().is_empty() {
        return Vec::new();
    }
    ChainSplitter::new(line).split()
}
