//! Bounded interactive prompts for values missing from the command line.

use std::io::{BufRead, Write};

/// Attempts before a prompt gives up.
pub const MAX_ATTEMPTS: usize = 3;

/// Asks `question` until `check` accepts the trimmed answer.
///
/// Rejections are reported on `output` and the question repeated, at most
/// [`MAX_ATTEMPTS`] times. End of input fails immediately.
pub fn ask<R, W, F>(
    input: &mut R,
    output: &mut W,
    question: &str,
    check: F,
) -> Result<String, String>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<(), String>,
{
    for _ in 0..MAX_ATTEMPTS {
        write!(output, "{question}").map_err(|err| format!("Failed to write prompt: {err}"))?;
        output
            .flush()
            .map_err(|err| format!("Failed to write prompt: {err}"))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|err| format!("Failed to read answer: {err}"))?;
        if read == 0 {
            return Err(format!("no answer given to {:?}", question.trim_end()));
        }

        let answer = line.trim();
        match check(answer) {
            Ok(()) => return Ok(answer.to_string()),
            Err(reason) => {
                writeln!(output, "{reason}")
                    .map_err(|err| format!("Failed to write prompt: {err}"))?;
            }
        }
    }

    Err(format!(
        "no acceptable answer after {MAX_ATTEMPTS} attempts to {:?}",
        question.trim_end()
    ))
}

/// Rejects empty answers.
pub fn non_empty(answer: &str) -> Result<(), String> {
    if answer.is_empty() {
        Err("A value is required.".to_string())
    } else {
        Ok(())
    }
}
