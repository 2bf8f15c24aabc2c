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

//! Result records.
//!
//! One solved instance is reported as one fixed-field text line:
//!
//! ```raw
//! nteams ratio seed variant      objective status seconds
//!   8 0.250   3 matching     1.2e1 optimal 0.042
//! ```
//!
//! A record with objective `-1`, status `ERROR` and seconds `-1` is the
//! sentinel of a failed solve. Whoever consumes the records resubmits those
//! instances as a whole.

use std::str::FromStr;
use thiserror::Error;

/// The formulation a record was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Column generation over round matchings.
    Matching,
    /// The compact assignment formulation, relaxed.
    Traditional,
    /// The compact assignment formulation with integrality.
    TraditionalIntegral,
}

impl Variant {
    /// Returns the label of the variant.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Matching => "matching",
            Variant::Traditional => "traditional",
            Variant::TraditionalIntegral => "traditional_integral",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raised when a string is not a well-formed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRecordError {
    /// The variant label is unknown.
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),
    /// The line does not have exactly seven fields.
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),
    /// A field could not be parsed.
    #[error("could not parse {field} from '{token}'")]
    Field { field: &'static str, token: String },
}

impl FromStr for Variant {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matching" => Ok(Variant::Matching),
            "traditional" => Ok(Variant::Traditional),
            "traditional_integral" => Ok(Variant::TraditionalIntegral),
            other => Err(ParseRecordError::UnknownVariant(other.to_owned())),
        }
    }
}

/// The result of solving one sampled instance.
///
/// `Display` writes the ratio and the seconds with three decimals, so a
/// record only parses back unchanged when both are multiples of `0.001`.
/// The objective is written exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Number of teams of the instance.
    pub num_teams: usize,
    /// Share of non-zero cost cells the instance was sampled with.
    pub ratio: f64,
    /// Seed the instance was sampled with.
    pub seed: u64,
    /// The formulation that was solved.
    pub variant: Variant,
    /// Objective of the last optimal relaxation, `-1` if there is none.
    pub objective: f64,
    /// A single-word solver status such as `optimal` or `ERROR`.
    pub status: String,
    /// Wall-clock time of the solve, `-1` for a failed solve.
    pub seconds: f64,
}

impl ResultRecord {
    /// The status of a failed solve.
    pub const ERROR_STATUS: &'static str = "ERROR";

    /// Returns the sentinel record of a failed solve.
    pub fn error(num_teams: usize, ratio: f64, seed: u64, variant: Variant) -> Self {
        Self {
            num_teams,
            ratio,
            seed,
            variant,
            objective: -1.0,
            status: Self::ERROR_STATUS.to_owned(),
            seconds: -1.0,
        }
    }

    /// Returns `true` for the sentinel of a failed solve.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.status == Self::ERROR_STATUS
    }
}

impl std::fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:3} {:5.3} {:3} {:<12} {:e} {} {:.3}",
            self.num_teams,
            self.ratio,
            self.seed,
            self.variant,
            self.objective,
            self.status,
            self.seconds
        )
    }
}

fn parse_field<T: FromStr>(field: &'static str, token: &str) -> Result<T, ParseRecordError> {
    token.parse().map_err(|_| ParseRecordError::Field {
        field,
        token: token.to_owned(),
    })
}

impl FromStr for ResultRecord {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(ParseRecordError::FieldCount(fields.len()));
        }
        Ok(Self {
            num_teams: parse_field("nteams", fields[0])?,
            ratio: parse_field("ratio", fields[1])?,
            seed: parse_field("seed", fields[2])?,
            variant: fields[3].parse()?,
            objective: parse_field("objective", fields[4])?,
            status: fields[5].to_owned(),
            seconds: parse_field("seconds", fields[6])?,
        })
    }
}
