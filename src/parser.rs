//! Small nom parsers for the textual bits of a schema.
//!
//! Names, type strings and literals arrive as raw catalog text. These parsers
//! pick them apart without ever touching the rest of the SQL grammar.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_till, take_while1},
    character::complete::char,
    combinator::{all_consuming, opt, recognize, rest},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use std::path::PathBuf;

use crate::error::{PgBuildError, PgBuildResult};

/// Where a table snapshot is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Structured description on disk.
    File(PathBuf),
    /// Live table reached through a connection URL.
    Table { url: String, table: String },
}

/// Parse a `"quoted"` identifier, keeping the quotes.
fn quoted_identifier(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        many0(alt((tag("\"\""), is_not("\"")))),
        char('"'),
    ))(input)
}

/// Parse a bare identifier up to the next dot.
fn bare_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '.' && c != '"')(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    alt((quoted_identifier, bare_identifier))(input)
}

/// Split a qualified name into schema and object name.
///
/// Only `schema.object` yields a schema; any other shape is returned whole.
///
/// ```
/// use pgbuild::parser::split_name;
///
/// assert_eq!(split_name("myschema.mytable"), (Some("myschema"), "mytable"));
/// assert_eq!(split_name("mytable"), (None, "mytable"));
/// ```
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match all_consuming(pair(identifier, opt(preceded(char('.'), identifier))))(name) {
        Ok((_, (schema, Some(object)))) => (Some(schema), object),
        _ => (None, name),
    }
}

/// Strip a parenthesized length/precision modifier from a type name.
///
/// `varchar(10)` becomes `varchar`; a string starting with `(` or without one
/// is returned unchanged.
pub fn base_type(data_type: &str) -> &str {
    let parsed: IResult<&str, &str> = take_till(|c: char| c == '(')(data_type);
    match parsed {
        Ok((remaining, base)) if !remaining.is_empty() && !base.is_empty() => base.trim_end(),
        _ => data_type,
    }
}

/// Unwrap a SQL string literal with an optional cast, e.g. `'it''s'::text`.
///
/// Returns `None` when the input is anything other than a single literal.
pub fn string_literal(input: &str) -> Option<String> {
    let literal = delimited(
        char('\''),
        recognize(many0(alt((tag("''"), is_not("'"))))),
        char('\''),
    );
    let cast = recognize(pair(tag("::"), rest));

    let parsed: IResult<&str, &str> = all_consuming(terminated(literal, opt(cast)))(input.trim());
    parsed.ok().map(|(_, body)| body.replace("''", "'"))
}

fn url_scheme(input: &str) -> IResult<&str, &str> {
    alt((tag("postgresql://"), tag("postgres://")))(input)
}

/// Parse a table location.
///
/// `postgres://user@host/db/schema.table` selects a live table: the connection
/// URL is everything before the last `/`. Anything else is a file path.
pub fn parse_location(location: &str) -> PgBuildResult<Location> {
    if url_scheme(location).is_err() {
        if location.trim().is_empty() {
            return Err(PgBuildError::InvalidLocation("empty location".to_string()));
        }
        return Ok(Location::File(PathBuf::from(location)));
    }

    let trimmed = location.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((url, table)) if !table.is_empty() && url_scheme(url).is_ok_and(|(host, _)| !host.is_empty()) => {
            Ok(Location::Table {
                url: url.to_string(),
                table: table.to_string(),
            })
        }
        _ => Err(PgBuildError::InvalidLocation(format!(
            "'{}' does not end with /<table>",
            location
        ))),
    }
}
