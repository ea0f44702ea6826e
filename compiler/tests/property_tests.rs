//! Property-based tests for the combinator engine.

use idlc_compiler::{
    combinator::{p_char, satisfy, zero_or_more, Parser},
    lexer::{p_identifier, p_int},
    state::State,
};
use proptest::prelude::*;

fn lowercase() -> Parser<char> {
    satisfy("lowercase", |c| c.is_ascii_lowercase())
}

proptest! {
    /// A matching character is consumed, moving exactly one column (or to
    /// the next line for a newline).
    #[test]
    fn satisfy_advances_one_character(c in any::<char>(), rest in "[a-z ]{0,8}") {
        let input = format!("{}{}", c, rest);
        let out = satisfy("any", |_| true).parse_str(&input).unwrap();
        prop_assert_eq!(out.value, c);
        prop_assert_eq!(out.state.pos, c.len_utf8());
        if c == '\n' {
            prop_assert_eq!((out.state.line, out.state.col), (1, 0));
        } else {
            prop_assert_eq!((out.state.line, out.state.col), (0, 1));
        }
    }

    /// A failing predicate consumes nothing: the caller's state is the one to
    /// continue from, and any parser retried on it sees the same input.
    #[test]
    fn satisfy_failure_consumes_nothing(input in "[A-Z0-9 ]{0,12}") {
        let start = State::new(&input);
        prop_assert!(lowercase().run(start).is_err());
        let retried = zero_or_more(satisfy("any", |_| true)).run(start).unwrap();
        prop_assert_eq!(retried.state.pos, input.len());
    }

    /// `or` returns the left result whenever the left side succeeds.
    #[test]
    fn or_is_left_biased(input in "[a-z]{1,12}") {
        let left = lowercase().map(|c| (c, true));
        let right = satisfy("any", |_| true).map(|c| (c, false));
        let combined = left.clone().or(right).parse_str(&input).unwrap();
        let alone = left.parse_str(&input).unwrap();
        prop_assert_eq!(combined, alone);
    }

    /// `zero_or_more` never fails; without a single match it stays put.
    #[test]
    fn zero_or_more_never_fails(input in "[A-Z0-9]{0,12}") {
        let out = zero_or_more(lowercase()).parse_str(&input).unwrap();
        prop_assert!(out.value.is_empty());
        prop_assert_eq!(out.state, State::new(&input));
    }

    #[test]
    fn identifiers_parse_whole(id in "[A-Za-z_][A-Za-z0-9_]{0,16}") {
        let out = p_identifier().parse_str(&id).unwrap();
        prop_assert_eq!(out.value.id, id.clone());
        prop_assert!(out.state.at_end());
    }

    #[test]
    fn ints_round_trip(n in any::<i32>()) {
        let text = n.to_string();
        let out = p_int().parse_str(&text).unwrap();
        prop_assert_eq!(out.value, n);
        prop_assert!(out.state.at_end());
    }
}

#[test]
fn or_falls_back_from_original_state() {
    let p = p_char('a').andr(p_char('b')).or(p_char('a').andr(p_char('c')));
    let out = p.parse_str("ac").unwrap();
    assert_eq!(out.value, 'c');
    assert!(out.state.at_end());
}
