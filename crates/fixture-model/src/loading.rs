// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Instance loader for the `.srr` cost format.
//!
//! The format is line oriented and whitespace separated:
//!
//! ```raw
//! n               // number of teams, even
//! i j r cost      // cost of teams i and j meeting in round r
//! ...
//! ```
//!
//! Omitted `(i, j, r)` triples are zero. A pair may be listed in either or
//! both orderings; every entry sets both, so the later one wins. With
//! `strict_symmetry(true)` the loader instead rejects an entry that contradicts
//! an earlier entry for the reverse ordering. Blank lines are skipped and `#`
//! starts a comment that runs to the end of the line.
//!
//! The loader accepts any `BufRead`, file path, raw reader, or string slice.
//! Every error past the header carries the 1-based line number it was found on.

use crate::{
    costs::{CostTensor, CostTensorBuilder, TournamentInstance},
    error::ModelError,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};
use thiserror::Error;

/// The error type for the instance loading process.
#[derive(Debug, Error)]
pub enum InstanceLoaderError {
    /// An I/O error occurred while reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The input contained no team count.
    #[error("unexpected end of file while looking for the number of teams")]
    UnexpectedEof,
    /// A token could not be parsed into the expected numeric type.
    #[error("line {line}: could not parse token '{token}' as type {type_name}")]
    Parse {
        line: usize,
        token: String,
        type_name: &'static str,
    },
    /// A cost entry has fewer than the four fields `i j r cost`.
    #[error("line {line}: expected `i j r cost`, found {found} field(s)")]
    IncompleteEntry { line: usize, found: usize },
    /// A line has more fields than its record allows.
    #[error("line {line}: unexpected trailing token '{token}'")]
    TrailingToken { line: usize, token: String },
    /// The entry is well formed but does not describe a valid tournament.
    #[error("line {line}: {source}")]
    Model { line: usize, source: ModelError },
}

/// A configurable loader for round-robin cost instances.
///
/// # Configuration
/// * `strict_symmetry`: If true, an entry `i j r c` fails when `j i r c'` was
///   listed before with `c' != c`. Off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceLoader {
    strict_symmetry: bool,
}

impl InstanceLoader {
    /// Creates a new `InstanceLoader` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether contradicting orderings of a pair are an error.
    #[inline]
    pub fn strict_symmetry(mut self, yes: bool) -> Self {
        self.strict_symmetry = yes;
        self
    }

    /// Loads a cost tensor from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<CostTensor, InstanceLoaderError> {
        let mut lines = LineScanner::new(rdr);

        let (header_line, header) = lines.next_record()?.ok_or(InstanceLoaderError::UnexpectedEof)?;
        let mut fields = header.split_whitespace();
        let num_teams: usize = parse_field(header_line, fields.next().unwrap_or_default())?;
        if let Some(token) = fields.next() {
            return Err(InstanceLoaderError::TrailingToken {
                line: header_line,
                token: token.to_owned(),
            });
        }

        let mut builder =
            CostTensorBuilder::new(num_teams).map_err(|source| InstanceLoaderError::Model {
                line: header_line,
                source,
            })?;
        // Ordered cells that were listed explicitly, only tracked in strict mode.
        let mut explicit = if self.strict_symmetry {
            vec![false; num_teams * num_teams * (num_teams - 1)]
        } else {
            Vec::new()
        };

        while let Some((line, record)) = lines.next_record()? {
            let tokens: Vec<&str> = record.split_whitespace().collect();
            if tokens.len() < 4 {
                return Err(InstanceLoaderError::IncompleteEntry {
                    line,
                    found: tokens.len(),
                });
            }
            if tokens.len() > 4 {
                return Err(InstanceLoaderError::TrailingToken {
                    line,
                    token: tokens[4].to_owned(),
                });
            }

            let i: usize = parse_field(line, tokens[0])?;
            let j: usize = parse_field(line, tokens[1])?;
            let round: usize = parse_field(line, tokens[2])?;
            let cost: f64 = parse_field(line, tokens[3])?;

            if self.strict_symmetry && i < num_teams && j < num_teams && round + 1 < num_teams {
                let reverse = round * num_teams * num_teams + j * num_teams + i;
                if explicit[reverse] {
                    if let Some(previous) = builder.get(j, i, round) {
                        if previous != cost {
                            return Err(InstanceLoaderError::Model {
                                line,
                                source: ModelError::Asymmetric {
                                    i,
                                    j,
                                    round,
                                    forward: cost,
                                    backward: previous,
                                },
                            });
                        }
                    }
                }
                explicit[round * num_teams * num_teams + i * num_teams + j] = true;
            }

            builder
                .set_cost(i, j, round, cost)
                .map_err(|source| InstanceLoaderError::Model { line, source })?;
        }

        Ok(builder.build())
    }

    /// Loads a cost tensor from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<CostTensor, InstanceLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a cost tensor from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<CostTensor, InstanceLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a cost tensor from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<CostTensor, InstanceLoaderError> {
        self.from_reader(s.as_bytes())
    }

    /// Loads a named instance from a file path, named after the file stem.
    pub fn instance_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<TournamentInstance, InstanceLoaderError> {
        let path = path.as_ref();
        let costs = self.from_path(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(TournamentInstance::new(name, costs))
    }
}

fn parse_field<T: FromStr>(line: usize, token: &str) -> Result<T, InstanceLoaderError> {
    token.parse::<T>().map_err(|_| InstanceLoaderError::Parse {
        line,
        token: token.to_owned(),
        type_name: std::any::type_name::<T>(),
    })
}

/// Yields the non-blank, comment-stripped lines of a reader with their line numbers.
struct LineScanner<R> {
    rdr: R,
    buf: String,
    line: usize,
}

impl<R: BufRead> LineScanner<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line: 0,
        }
    }

    /// Returns the next line holding at least one token, or `None` at EOF.
    fn next_record(&mut self) -> Result<Option<(usize, &str)>, InstanceLoaderError> {
        loop {
            self.buf.clear();
            if self.rdr.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let content = match self.buf.find('#') {
                Some(pos) => &self.buf[..pos],
                None => self.buf.as_str(),
            };
            if !content.trim().is_empty() {
                break;
            }
        }

        let content = match self.buf.find('#') {
            Some(pos) => &self.buf[..pos],
            None => self.buf.as_str(),
        };
        Ok(Some((self.line, content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{RoundIndex, TeamIndex};

    const SMALL_INSTANCE: &str = r#"
        # four teams, three rounds
        4
        0 1 0 1.0
        1 0 0 1.0   # both orderings listed
        2 3 2 0.5

        1 3 1 2
    "#;

    fn cost(costs: &CostTensor, i: usize, j: usize, r: usize) -> f64 {
        costs.cost(TeamIndex::new(i), TeamIndex::new(j), RoundIndex::new(r))
    }

    #[test]
    fn test_loads_and_symmetrizes() {
        let costs = InstanceLoader::new().from_str(SMALL_INSTANCE).unwrap();

        assert_eq!(costs.num_teams(), 4);
        assert_eq!(cost(&costs, 0, 1, 0), 1.0);
        assert_eq!(cost(&costs, 3, 2, 2), 0.5);
        assert_eq!(cost(&costs, 3, 1, 1), 2.0);
        assert_eq!(cost(&costs, 0, 2, 0), 0.0);
        assert_eq!(costs.nonzero_count(), 3);
    }

    #[test]
    fn test_later_entry_wins_by_default() {
        let data = "4\n0 1 0 1.0\n1 0 0 3.0\n";
        let costs = InstanceLoader::new().from_str(data).unwrap();
        assert_eq!(cost(&costs, 0, 1, 0), 3.0);
        assert_eq!(cost(&costs, 1, 0, 0), 3.0);
    }

    #[test]
    fn test_strict_symmetry_rejects_contradiction() {
        let data = "4\n0 1 0 1.0\n1 0 0 3.0\n";
        let err = InstanceLoader::new()
            .strict_symmetry(true)
            .from_str(data)
            .unwrap_err();
        match err {
            InstanceLoaderError::Model {
                line,
                source: ModelError::Asymmetric { i, j, round, .. },
            } => {
                assert_eq!(line, 3);
                assert_eq!((i, j, round), (1, 0, 0));
            }
            other => panic!("expected an asymmetry error, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_symmetry_accepts_consistent_orderings() {
        let costs = InstanceLoader::new()
            .strict_symmetry(true)
            .from_str(SMALL_INSTANCE)
            .unwrap();
        assert_eq!(cost(&costs, 1, 0, 0), 1.0);
    }

    #[test]
    fn test_odd_team_count_reports_header_line() {
        let err = InstanceLoader::new().from_str("\n\n5\n").unwrap_err();
        match err {
            InstanceLoaderError::Model { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source, ModelError::OddTeamCount(5));
            }
            other => panic!("expected a model error, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_team_count_is_an_error() {
        for loader in [InstanceLoader::new(), InstanceLoader::new().strict_symmetry(true)] {
            for header in ["3000000", "100000", "18446744073709551614"] {
                let data = format!("{header}\n0 1 0 1\n");
                let err = loader.from_str(&data).unwrap_err();
                assert!(
                    matches!(
                        err,
                        InstanceLoaderError::Model {
                            line: 1,
                            source: ModelError::TooManyTeams { .. }
                        }
                    ),
                    "unexpected error for {header} teams: {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_empty_input_is_unexpected_eof() {
        let err = InstanceLoader::new().from_str("  # nothing here\n").unwrap_err();
        assert!(matches!(err, InstanceLoaderError::UnexpectedEof));
    }

    #[test]
    fn test_incomplete_entry() {
        let err = InstanceLoader::new().from_str("4\n0 1 2\n").unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::IncompleteEntry { line: 2, found: 3 }
        ));
    }

    #[test]
    fn test_trailing_token() {
        let err = InstanceLoader::new().from_str("4 4\n").unwrap_err();
        assert!(matches!(err, InstanceLoaderError::TrailingToken { line: 1, .. }));
    }

    #[test]
    fn test_parse_error_structure() {
        let err = InstanceLoader::new().from_str("4\n0 x 1 1.0\n").unwrap_err();
        match err {
            InstanceLoaderError::Parse {
                line,
                token,
                type_name,
            } => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
                assert!(type_name.contains("usize"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_entries() {
        let err = InstanceLoader::new().from_str("4\n0 4 0 1\n").unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::Model {
                line: 2,
                source: ModelError::TeamOutOfRange { team: 4, num_teams: 4 }
            }
        ));

        let err = InstanceLoader::new().from_str("4\n0 1 3 1\n").unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::Model {
                source: ModelError::RoundOutOfRange { round: 3, .. },
                ..
            }
        ));

        let err = InstanceLoader::new().from_str("4\n2 2 0 1\n").unwrap_err();
        assert!(matches!(
            err,
            InstanceLoaderError::Model {
                source: ModelError::SelfMatch(2),
                ..
            }
        ));
    }
}
