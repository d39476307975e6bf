use colored::Colorize;
use std::io::{self, BufRead, Write};

/// True when a person is at the keyboard and may be asked for values.
pub fn interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Ask for one value on stderr, re-asking until `parse` accepts the answer.
pub fn ask<T, F>(label: &str, parse: F) -> Result<T, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Result<T, String>,
{
    let stdin = io::stdin();
    let mut lines = stdin.lock();
    loop {
        eprint!("{}: ", label);
        io::stderr().flush()?;

        let mut answer = String::new();
        if lines.read_line(&mut answer)? == 0 {
            return Err(format!("No value entered for {}", label).into());
        }

        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(reason) => eprintln!("{} {}", "invalid:".yellow(), reason),
        }
    }
}

/// Use the flag value when given, otherwise prompt for it or fail naming the
/// missing flag.
pub fn require<T, F>(
    value: Option<T>,
    flag: &str,
    label: &str,
    parse: F,
) -> Result<T, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Result<T, String>,
{
    match value {
        Some(v) => Ok(v),
        None if interactive() => ask(label, parse),
        None => Err(format!("missing required flag {} (or provide --input)", flag).into()),
    }
}

/// Numbered menu; returns the index of the chosen option.
pub fn choose(title: &str, options: &[&str]) -> Result<usize, Box<dyn std::error::Error>> {
    eprintln!("{}", title.bold());
    for (i, option) in options.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, option);
    }
    ask("Choice", |raw| match raw.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Ok(n - 1),
        _ => Err(format!("enter a number from 1 to {}", options.len())),
    })
}
