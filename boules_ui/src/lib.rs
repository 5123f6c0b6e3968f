#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Line-based terminal operator: the number picker and yes/no question of the
//! machine's front panel, read from any `BufRead` and echoed to any `Write`.

use std::io::{self, BufRead, Write};

use boules_traits::{BoxError, Operator};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("input closed")]
    Closed,
    #[error("empty range [{min}, {max}]")]
    EmptyRange { min: i32, max: i32 },
    #[error("terminal i/o: {0}")]
    Io(#[from] io::Error),
}

/// Words accepted as "yes" / "no" (English and German, as on the panel).
const YES: [&str; 4] = ["y", "yes", "j", "ja"];
const NO: [&str; 4] = ["n", "no", "nein", "nee"];

pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String, UiError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(UiError::Closed);
        }
        Ok(line.trim().to_string())
    }

    fn prompt(&mut self, text: &str) -> Result<String, UiError> {
        write!(self.output, "{text} ")?;
        self.output.flush()?;
        self.read_line()
    }

    fn integer(&mut self, min: i32, max: i32, default: Option<i32>) -> Result<i32, UiError> {
        if min > max {
            return Err(UiError::EmptyRange { min, max });
        }
        let preset = default
            .unwrap_or_else(|| midpoint(min, max))
            .clamp(min, max);
        loop {
            let line = self.prompt(&format!("number [{min}-{max}] ({preset}):"))?;
            if line.is_empty() {
                return Ok(preset);
            }
            match line.parse::<i64>() {
                Ok(n) => {
                    let clamped = n.clamp(i64::from(min), i64::from(max));
                    if clamped != n {
                        writeln!(self.output, "{n} is outside [{min}, {max}], using {clamped}")?;
                    }
                    // clamped into i32 bounds above
                    return Ok(i32::try_from(clamped).unwrap_or(preset));
                }
                Err(_) => {
                    tracing::debug!(input = %line, "not a number");
                    writeln!(self.output, "'{line}' is not a whole number")?;
                }
            }
        }
    }

    fn boolean(&mut self, question: &str) -> Result<bool, UiError> {
        loop {
            let line = self.prompt(&format!("{question} [Y/n]"))?.to_lowercase();
            if line.is_empty() || YES.contains(&line.as_str()) {
                return Ok(true);
            }
            if NO.contains(&line.as_str()) {
                return Ok(false);
            }
            writeln!(self.output, "please answer yes or no")?;
        }
    }
}

/// Floor of the mean, without overflow.
fn midpoint(min: i32, max: i32) -> i32 {
    let m = (i64::from(min) + i64::from(max)).div_euclid(2);
    i32::try_from(m).unwrap_or(min)
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn request_integer(
        &mut self,
        min: i32,
        max: i32,
        default: Option<i32>,
    ) -> Result<i32, BoxError> {
        Ok(self.integer(min, max, default)?)
    }

    fn request_boolean(&mut self, prompt: &str) -> Result<bool, BoxError> {
        Ok(self.boolean(prompt)?)
    }

    fn display(&mut self, lines: &[&str]) {
        for line in lines {
            if let Err(e) = writeln!(self.output, "{line}") {
                tracing::warn!(error = %e, "display write failed");
                return;
            }
        }
        let _ = self.output.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_floors_like_integer_division() {
        assert_eq!(midpoint(10, 200), 105);
        assert_eq!(midpoint(-3, 0), -2);
        assert_eq!(midpoint(i32::MAX, i32::MAX), i32::MAX);
    }
}
