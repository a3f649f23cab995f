//! Parsers for loosely typed value literals.
//!
//! Trees arriving from imports or generated by the AI flows often carry
//! values like `"16dp"` or `"rgba(0, 0, 0, 0.5)"` where a number or color is
//! expected. These parsers recover the typed value.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, map_opt, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::types::Color;

/// Parse a number (integer or float, optionally negative).
pub fn number(input: &str) -> IResult<&str, f64> {
    map_opt(
        recognize(tuple((
            opt(char('-')),
            take_while_m_n(1, 32, |c: char| c.is_ascii_digit()),
            opt(pair(char('.'), take_while_m_n(1, 32, |c: char| c.is_ascii_digit()))),
        ))),
        |s: &str| s.parse().ok(),
    )(input)
}

/// Parse a dimension unit suffix.
pub fn unit(input: &str) -> IResult<&str, &str> {
    alt((tag("dp"), tag("sp"), tag("px"), tag("pt")))(input)
}

fn dimension(input: &str) -> IResult<&str, f64> {
    delimited(multispace0, terminated(number, opt(unit)), multispace0)(input)
}

/// Parse a dimension literal: `16`, `16dp`, `12.5px`, `14sp`.
///
/// Units are accepted and discarded; the builder stores dimensions as plain
/// numbers.
pub fn parse_dimension(input: &str) -> Option<f64> {
    all_consuming(dimension)(input).ok().map(|(_, n)| n)
}

fn hex_digits(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), take_while_m_n(3, 8, |c: char| c.is_ascii_hexdigit()))(input)
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_opt(hex_digits, |hex: &str| {
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut rgb = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Color::rgb(rgb.next()??, rgb.next()??, rgb.next()??))
            }
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    })(input)
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn rgb_function(input: &str) -> IResult<&str, Color> {
    map_opt(
        preceded(
            pair(tag_no_case("rgb"), opt(tag_no_case("a"))),
            delimited(
                ws(char('(')),
                separated_list1(ws(char(',')), number),
                ws(char(')')),
            ),
        ),
        |parts: Vec<f64>| {
            let byte = |v: f64| (0.0..=255.0).contains(&v).then_some(v.round() as u8);
            match parts.as_slice() {
                [r, g, b] => Some(Color::rgb(byte(*r)?, byte(*g)?, byte(*b)?)),
                [r, g, b, a] if (0.0..=1.0).contains(a) => Some(Color::rgba(
                    byte(*r)?,
                    byte(*g)?,
                    byte(*b)?,
                    (a * 255.0).round() as u8,
                )),
                _ => None,
            }
        },
    )(input)
}

/// Parse a hex color: `#RGB`, `#RRGGBB` or web-order `#RRGGBBAA`.
pub fn parse_hex_color(input: &str) -> Option<Color> {
    all_consuming(hex_color)(input.trim()).ok().map(|(_, c)| c)
}

/// Parse any supported color literal (hex or `rgb()`/`rgba()`).
pub fn parse_color(input: &str) -> Option<Color> {
    all_consuming(ws(alt((hex_color, rgb_function))))(input)
        .ok()
        .map(|(_, c)| c)
}

/// Parse a boolean literal (`true`/`false`, case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    all_consuming(ws(alt((
        map(tag_no_case("true"), |_| true),
        map(tag_no_case("false"), |_| false),
    ))))(input)
    .ok()
    .map(|(_, b)| b)
}
