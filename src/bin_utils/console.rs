use std::{
    fmt::Display,
    io::{self, BufRead, Write},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input stream closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Line based terminal I/O.
pub struct Console<'w, R, W: 'w> {
    input: R,
    output: &'w mut W,
}

impl<'w, R, W> Console<'w, R, W>
where
    R: BufRead,
    W: Write + 'w,
{
    pub fn new(input: R, output: &'w mut W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl Display) -> Result<(), PromptError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Prints `prompt` and reads one line without its line ending.
    pub fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Asks again until `parse` accepts the answer, printing every rejection.
    pub fn ask_until<T, E, F>(&mut self, prompt: &str, mut parse: F) -> Result<T, PromptError>
    where
        E: Display,
        F: FnMut(&str) -> Result<T, E>,
    {
        loop {
            let answer = self.ask(prompt)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(err) => self.say(format_args!("Invalid input: {err}"))?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::from_utf8;

    use super::*;

    #[test]
    fn ask_strips_line_endings() {
        let mut output = Vec::new();
        let mut console = Console::new("  42 \r\nlast".as_bytes(), &mut output);
        assert_eq!(console.ask("First: ").unwrap(), "  42 ");
        assert_eq!(console.ask("Second: ").unwrap(), "last");
        assert!(matches!(console.ask("Third: "), Err(PromptError::Closed)));
        assert_eq!(from_utf8(&output).unwrap(), "First: Second: Third: ");
    }

    #[test]
    fn ask_until_reprompts() {
        let mut output = Vec::new();
        let mut console = Console::new("x\n-1\n7\n".as_bytes(), &mut output);
        let value = console
            .ask_until("n? ", |answer| match answer.parse::<u32>() {
                Ok(n) => Ok(n),
                Err(_) => Err(format!("`{answer}` is not a count")),
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(
            from_utf8(&output).unwrap(),
            "n? Invalid input: `x` is not a count\nn? Invalid input: `-1` is not a count\nn? "
        );
    }
}
