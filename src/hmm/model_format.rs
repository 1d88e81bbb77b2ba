//! Plain-text profile files.
//!
//! ```text
//! N
//! T[0] .. T[N-1]          9 values per line
//! nan,nan,..              placeholder for the begin state's match emissions
//! e_M[1] .. e_M[N-1]      20 values per line
//! e_I[0] .. e_I[N-1]      20 values per line
//! ```
//!
//! Values are written comma separated with `MODEL_DECIMALS` decimals. The reader also
//! accepts whitespace separators and skips blank lines.

use super::alphabet::ALPHABET_SIZE;
use super::builder::MODEL_DECIMALS;
use super::profile::{EmissionRow, TransitionRow};
use super::state::TRANSITION_ROW_LEN;
use super::{Profile, ProfileError};
use itertools::Itertools;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

const PLACEHOLDER: &str = "nan";

impl Profile {
    pub fn write_model<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{}", self)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ProfileError> {
        let mut lines = ModelLines::new(reader);

        let (line, fields) = lines.next_fields("the model length")?;
        let num_positions = match fields.as_slice() {
            [field] => field.parse::<usize>().ok().filter(|&n| n > 0),
            _ => None,
        }
        .ok_or_else(|| ProfileError::ModelFormat {
            line,
            message: format!("expected a positive model length, found '{}'", fields.join(" ")),
        })?;

        let mut transitions = Vec::with_capacity(num_positions);
        for _ in 0..num_positions {
            let values = lines.next_values::<TRANSITION_ROW_LEN>("a transition row")?;
            transitions.push(TransitionRow::from(values));
        }

        lines.next_placeholder()?;
        let mut match_emissions: Vec<Option<EmissionRow>> = Vec::with_capacity(num_positions);
        match_emissions.push(None);
        for _ in 1..num_positions {
            match_emissions.push(Some(lines.next_values("a match emission row")?));
        }

        let mut insert_emissions = Vec::with_capacity(num_positions);
        for _ in 0..num_positions {
            insert_emissions.push(lines.next_values("an insert emission row")?);
        }

        lines.expect_end()?;
        Profile::new(transitions, match_emissions, insert_emissions)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.num_positions())?;
        for row in self.transition_rows() {
            write_row(f, row.values())?;
        }
        for row in self.match_emission_rows() {
            match row {
                Some(values) => write_row(f, values)?,
                None => writeln!(f, "{}", [PLACEHOLDER; ALPHABET_SIZE].join(","))?,
            }
        }
        for row in self.insert_emission_rows() {
            write_row(f, row)?;
        }
        Ok(())
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::from_reader(s.as_bytes())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    writeln!(
        f,
        "{}",
        values
            .iter()
            .map(|value| format!("{:.*}", MODEL_DECIMALS as usize, value))
            .join(",")
    )
}

struct ModelLines<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> ModelLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Fields of the next non-blank line with its 1-based line number, `None` at end of file
    fn next_record(&mut self) -> Result<Option<(usize, Vec<String>)>, ProfileError> {
        for result in self.lines.by_ref() {
            self.line += 1;
            let text = result.map_err(|e| ProfileError::ModelFormat {
                line: self.line,
                message: e.to_string(),
            })?;
            let fields: Vec<String> = text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|field| !field.is_empty())
                .map(String::from)
                .collect();
            if !fields.is_empty() {
                return Ok(Some((self.line, fields)));
            }
        }
        Ok(None)
    }

    fn next_fields(&mut self, expected: &str) -> Result<(usize, Vec<String>), ProfileError> {
        self.next_record()?.ok_or_else(|| ProfileError::ModelFormat {
            line: self.line + 1,
            message: format!("unexpected end of file, expected {}", expected),
        })
    }

    fn next_values<const LEN: usize>(&mut self, expected: &str) -> Result<[f32; LEN], ProfileError> {
        let (line, fields) = self.next_fields(expected)?;
        if fields.len() != LEN {
            return Err(ProfileError::ModelFormat {
                line,
                message: format!("expected {} values in {}, found {}", LEN, expected, fields.len()),
            });
        }
        let mut values = [0.0; LEN];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field.parse().map_err(|_| ProfileError::ModelFormat {
                line,
                message: format!("invalid number '{}'", field),
            })?;
        }
        Ok(values)
    }

    fn next_placeholder(&mut self) -> Result<(), ProfileError> {
        let expected = "the begin state placeholder row";
        let (line, fields) = self.next_fields(expected)?;
        let valid = fields.len() == ALPHABET_SIZE
            && fields.iter().all(|field| field.eq_ignore_ascii_case(PLACEHOLDER));
        if !valid {
            return Err(ProfileError::ModelFormat {
                line,
                message: format!("expected {} '{}' values in {}", ALPHABET_SIZE, PLACEHOLDER, expected),
            });
        }
        Ok(())
    }

    fn expect_end(&mut self) -> Result<(), ProfileError> {
        match self.next_record()? {
            Some((line, _)) => Err(ProfileError::ModelFormat {
                line,
                message: "unexpected data after the last insert emission row".to_string(),
            }),
            None => Ok(()),
        }
    }
}
