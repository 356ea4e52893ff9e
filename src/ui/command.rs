use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_till1};
use nom::character::complete::{char, space1};
use nom::combinator::{eof, map, rest, value, verify};
use nom::sequence::{preceded, separated_pair, terminated};
use nom::{IResult, Parser};

/// A table picked either by its position in the configured list (1-based) or
/// by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    Index(usize),
    Name(String),
}

impl TableRef {
    fn from_text(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<usize>() {
            Ok(i) => TableRef::Index(i),
            Err(_) => TableRef::Name(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tables,
    Use(TableRef),
    Show,
    Add,
    Update,
    Delete,
    Set { column: String, value: String },
    Submit,
    Cancel,
    Form,
    Help,
    Exit,
}

fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag_no_case(word), eof)
}

fn bare(input: &str) -> IResult<&str, Command> {
    alt((
        value(Command::Tables, keyword("tables")),
        value(Command::Show, keyword("show")),
        value(Command::Add, keyword("add")),
        value(Command::Update, keyword("update")),
        value(Command::Delete, keyword("delete")),
        value(Command::Submit, keyword("submit")),
        value(Command::Cancel, keyword("cancel")),
        value(Command::Form, keyword("form")),
        value(Command::Help, alt((keyword("help"), keyword("?")))),
        value(Command::Exit, alt((keyword("exit"), keyword(".exit"), keyword("quit")))),
    ))
    .parse(input)
}

fn use_table(input: &str) -> IResult<&str, Command> {
    map(
        preceded((tag_no_case("use"), space1), verify(rest, |s: &str| !s.trim().is_empty())),
        |name: &str| Command::Use(TableRef::from_text(name)),
    )
    .parse(input)
}

fn set_field(input: &str) -> IResult<&str, Command> {
    map(
        preceded(
            (tag_no_case("set"), space1),
            separated_pair(
                verify(take_till1(|c: char| c == '='), |s: &str| !s.trim().is_empty()),
                char('='),
                rest,
            ),
        ),
        |(column, value): (&str, &str)| Command::Set {
            column: column.trim().to_string(),
            value: value.trim().to_string(),
        },
    )
    .parse(input)
}

/// Parse one line typed at the prompt.
pub fn parse_command(input: &str) -> Result<Command, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Empty input".to_string());
    }
    match alt((bare, use_table, set_field)).parse(trimmed) {
        Ok((_, command)) => Ok(command),
        Err(_) => {
            let first = trimmed.split_whitespace().next().unwrap_or(trimmed);
            Err(format!("Unrecognized command: {} (type help)", first))
        }
    }
}
