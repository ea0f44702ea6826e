//! Token-level rules: identifiers, literals, whitespace and comments.

use crate::{
    combinator::{
        any_of, choice, end_of_input, one_or_more, optional, p_char, p_string, satisfy, sequence, zero_or_more,
        Parser,
    },
    state::{ParserError, Success},
    types::{Identifier, TypeIdentifier},
};

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `[A-Za-z_][A-Za-z0-9_]*` as a plain string.
pub fn p_name() -> Parser<String> {
    let first_char = satisfy("identifier-start", is_identifier_start);
    let other_char = satisfy("identifier-char", is_identifier_char);
    first_char
        .and(zero_or_more(other_char))
        .map(|chars| chars.into_iter().collect::<String>())
}

pub fn p_identifier() -> Parser<Identifier> {
    p_name().label("identifier").map(Identifier::new)
}

/// `[A-Z][A-Za-z0-9_]*`
pub fn p_type_identifier() -> Parser<TypeIdentifier> {
    let first_char = satisfy("uppercase", |c| c.is_ascii_uppercase());
    let other_char = satisfy("identifier-char", is_identifier_char);
    first_char
        .and(zero_or_more(other_char))
        .label("type-identifier")
        .map(|chars| TypeIdentifier::new(chars.into_iter().collect::<String>()))
}

pub fn p_digit() -> Parser<char> {
    satisfy("digit", |c| c.is_ascii_digit())
}

pub fn p_digits() -> Parser<Vec<char>> {
    one_or_more(p_digit()).label("digits")
}

fn p_sign() -> Parser<char> {
    any_of(['-', '+']).label("sign")
}

/// Optional sign followed by decimal digits. Values outside `i32` are
/// rejected rather than wrapped.
pub fn p_int() -> Parser<i32> {
    optional(p_sign())
        .and(p_digits())
        .label("int")
        .try_map(|chars| {
            let text: String = chars.into_iter().collect();
            text.parse::<i32>()
                .map_err(|_| format!("integer {} out of range", text))
        })
}

/// Decimal float literal: sign, digits, optional fraction, optional exponent.
pub fn p_number() -> Parser<f64> {
    let int_part = optional(p_sign()).and(p_digits());
    let fraction = optional(p_char('.').and(p_digits()));
    let exponent = optional(any_of(['e', 'E']).and(optional(p_sign())).and(p_digits()));
    int_part
        .and(fraction)
        .and(exponent)
        .label("number")
        .try_map(|chars| {
            let text: String = chars.into_iter().collect();
            text.parse::<f64>()
                .map_err(|_| format!("invalid number {}", text))
        })
}

pub fn p_whitespace_char() -> Parser<char> {
    any_of([' ', '\t', '\n', '\r']).label("whitespace-char")
}

pub fn p_whitespace() -> Parser<Vec<char>> {
    one_or_more(p_whitespace_char()).label("whitespace")
}

/// Everything up to, but not including, the next newline.
pub fn p_all_until_newline() -> Parser<String> {
    zero_or_more(satisfy("comment", |c| c != '\n')).map(|chars| chars.into_iter().collect::<String>())
}

/// `//` line comment. The terminating newline is consumed; a comment on the
/// last line may end at end of input instead. The returned text is trimmed.
pub fn p_comment() -> Parser<String> {
    p_string("//")
        .andr(p_all_until_newline())
        .andl(p_char('\n').ignore().or(end_of_input()))
        .map(|text| text.trim().to_string())
        .label("comment")
}

/// Insignificant whitespace and comments. Always succeeds.
pub fn delimiters() -> Parser<()> {
    zero_or_more(p_whitespace().ignore().or(p_comment().ignore())).ignore()
}

fn p_unescaped_char() -> Parser<char> {
    satisfy("char", |c| c != '\\' && c != '"')
}

fn p_escaped_char() -> Parser<char> {
    const ESCAPES: [(&str, char); 8] = [
        ("\\\"", '"'),
        ("\\\\", '\\'),
        ("\\/", '/'),
        ("\\b", '\u{08}'),
        ("\\f", '\u{0C}'),
        ("\\n", '\n'),
        ("\\r", '\r'),
        ("\\t", '\t'),
    ];
    choice(ESCAPES.iter().map(|&(text, c)| p_string(text).to(c)).collect()).label("escaped-char")
}

fn p_hex_digit() -> Parser<char> {
    satisfy("hex-digit", |c| c.is_ascii_hexdigit())
}

/// `\u` followed by four hex digits, as one UTF-16 code unit.
fn p_code_unit() -> Parser<u16> {
    p_string("\\u")
        .andr(sequence(vec![p_hex_digit(), p_hex_digit(), p_hex_digit(), p_hex_digit()]))
        .try_map(|digits| {
            let text: String = digits.into_iter().collect();
            u16::from_str_radix(&text, 16).map_err(|_| format!("invalid unicode escape {}", text))
        })
}

/// A `\uXXXX` escape. A high surrogate must be followed by an escaped low
/// surrogate; the pair decodes to one character.
fn p_unicode_char() -> Parser<char> {
    let unit = p_code_unit();
    Parser::new(move |start| {
        let first = unit.run(start)?;
        if !(0xD800..0xDC00).contains(&first.value) {
            return char::from_u32(u32::from(first.value))
                .map(|c| Success::new(c, first.state))
                .ok_or_else(|| ParserError::syntax("unicode-char", &start));
        }
        let second = unit.run(first.state)?;
        match char::decode_utf16([first.value, second.value]).next() {
            Some(Ok(c)) => Ok(Success::new(c, second.state)),
            _ => Err(ParserError::syntax("unicode-char", &start)),
        }
    })
    .label("unicode-char")
}

/// A double-quoted string with JSON-style escapes. Unknown escapes fail the
/// whole string.
pub fn p_quoted_string() -> Parser<String> {
    let quote = p_char('"').label("quote");
    let character = p_unescaped_char().or(p_escaped_char()).or(p_unicode_char());
    quote
        .clone()
        .andr(zero_or_more(character))
        .andl(quote)
        .map(|chars| chars.into_iter().collect::<String>())
        .label("quoted-string")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;

    #[test]
    fn test_type_identifier() {
        assert_eq!(
            p_type_identifier().parse_str("Abcd"),
            Ok(Success::new(
                TypeIdentifier::new("Abcd"),
                State { input: "Abcd", line: 0, col: 4, pos: 4 }
            ))
        );
        assert_eq!(
            p_type_identifier().parse_str("abcd"),
            Err(ParserError::UnexpectedToken {
                label: Some("type-identifier".into()),
                found: 'a',
                line:  0,
                col:   0,
            })
        );
    }

    #[test]
    fn test_identifier_accepts_underscore_and_digits() {
        let out = p_identifier().parse_str("_line_2 rest").unwrap();
        assert_eq!(out.value, Identifier::new("_line_2"));
        assert_eq!(out.state.remaining(), " rest");
        assert!(p_identifier().parse_str("2abc").is_err());
    }

    #[test]
    fn test_int() {
        assert_eq!(p_int().parse_str("42").unwrap().value, 42);
        assert_eq!(p_int().parse_str("-7;").unwrap().value, -7);
        assert_eq!(p_int().parse_str("+3").unwrap().value, 3);
        assert_eq!(p_int().parse_str("x").unwrap_err().label(), Some("int"));
        assert!(p_int().parse_str("99999999999").is_err());
    }

    #[test]
    fn test_number() {
        assert_eq!(p_number().parse_str("12").unwrap().value, 12.0);
        assert_eq!(p_number().parse_str("-1.5").unwrap().value, -1.5);
        assert_eq!(p_number().parse_str("2.5e3").unwrap().value, 2500.0);
        assert_eq!(p_number().parse_str("1E-2").unwrap().value, 0.01);
        let out = p_number().parse_str("3.x").unwrap();
        assert_eq!(out.value, 3.0);
        assert_eq!(out.state.pos, 1);
    }

    #[test]
    fn test_comment() {
        let input = "// blafazls\n";
        assert_eq!(
            p_comment().parse_str(input),
            Ok(Success::new(
                "blafazls".to_string(),
                State { input, line: 1, col: 0, pos: input.len() }
            ))
        );
    }

    #[test]
    fn test_comment_at_end_of_input() {
        let out = p_comment().parse_str("// last").unwrap();
        assert_eq!(out.value, "last");
        assert!(out.state.at_end());
    }

    #[test]
    fn test_delimiters_mix_comments_and_whitespace() {
        let input = "  // one\n\t// two\n  x";
        let out = delimiters().parse_str(input).unwrap();
        assert_eq!(out.state.remaining(), "x");
        assert_eq!((out.state.line, out.state.col), (2, 2));

        let out = delimiters().parse_str("x").unwrap();
        assert_eq!(out.state.pos, 0);
    }

    #[test]
    fn test_delimiters_accept_crlf() {
        let out = delimiters().parse_str("// note\r\n\r\n  x").unwrap();
        assert_eq!(out.state.remaining(), "x");
        assert_eq!((out.state.line, out.state.col), (2, 2));
    }

    #[test]
    fn test_quoted_string_escapes() {
        let out = p_quoted_string().parse_str(r#""a\"b\\c\/d\n\t""#).unwrap();
        assert_eq!(out.value, "a\"b\\c/d\n\t");
        assert!(out.state.at_end());
    }

    #[test]
    fn test_quoted_string_unicode() {
        assert_eq!(p_quoted_string().parse_str(r#""\u0041\u00e9""#).unwrap().value, "Aé");
        assert_eq!(p_quoted_string().parse_str(r#""\uD83D\uDE00""#).unwrap().value, "😀");
        assert!(p_quoted_string().parse_str(r#""\uD83D""#).is_err());
        assert!(p_quoted_string().parse_str(r#""\uDE00""#).is_err());
    }

    #[test]
    fn test_quoted_string_rejects_unknown_escape() {
        let err = p_quoted_string().parse_str(r#""a\qb""#).unwrap_err();
        assert_eq!(err.label(), Some("quoted-string"));
    }
}
