use anyhow::Context;
use std::io::BufRead;

/// Training sequences, one per non-blank input line.
///
/// Text corpora are read as characters; pre-encoded corpora (game moves,
/// token ids from an external pipeline) as whitespace-separated integers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus<S>(Vec<Vec<S>>);

impl<S> Corpus<S> {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Vec<S>> {
        self.0.iter()
    }
    pub fn push(&mut self, sequence: Vec<S>) {
        self.0.push(sequence);
    }
    /// Total symbols across all sequences.
    pub fn symbols(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }
}

impl Corpus<char> {
    /// One sequence of characters per trimmed, non-blank line.
    pub fn read(reader: impl BufRead) -> anyhow::Result<Self> {
        reader
            .lines()
            .enumerate()
            .map(|(n, line)| line.with_context(|| format!("read line {}", n + 1)))
            .filter_map(|line| match line {
                Ok(line) => Self::chars(&line).map(Ok),
                Err(e) => Some(Err(e)),
            })
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Self)
    }
    /// Characters of a trimmed line, or None if it is blank.
    pub fn chars(line: &str) -> Option<Vec<char>> {
        match line.trim() {
            "" => None,
            line => Some(line.chars().collect()),
        }
    }
}

impl Corpus<u32> {
    /// One sequence of integer tokens per non-blank line.
    pub fn read_tokens(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut corpus = Self::default();
        for (n, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read line {}", n + 1))?;
            let tokens = Self::tokens(&line).with_context(|| format!("parse line {}", n + 1))?;
            if let Some(tokens) = tokens {
                corpus.push(tokens);
            }
        }
        Ok(corpus)
    }
    /// Whitespace-separated tokens of a line, or None if it is blank.
    pub fn tokens(line: &str) -> anyhow::Result<Option<Vec<u32>>> {
        let tokens = line
            .split_whitespace()
            .map(|t| t.parse::<u32>().with_context(|| format!("invalid token {:?}", t)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Some(tokens).filter(|t| !t.is_empty()))
    }
}

impl<S> IntoIterator for Corpus<S> {
    type Item = Vec<S>;
    type IntoIter = std::vec::IntoIter<Vec<S>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<S> From<Vec<Vec<S>>> for Corpus<S> {
    fn from(sequences: Vec<Vec<S>>) -> Self {
        Self(sequences)
    }
}

impl From<Vec<&str>> for Corpus<char> {
    fn from(lines: Vec<&str>) -> Self {
        Self(lines.into_iter().filter_map(Self::chars).collect())
    }
}
