//! The parser-combinator engine.
//!
//! A [`Parser`] wraps a pure function `State -> ParseResult`. Parsers are cheap
//! to clone (the function is reference counted) and never mutate anything, so
//! a failed alternative leaves nothing behind and `or` simply retries from the
//! original state.

use std::rc::Rc;

use crate::state::{ParseResult, ParserError, State, Success};

type ParseFn<T> = dyn for<'s> Fn(State<'s>) -> ParseResult<'s, T>;

pub struct Parser<T> {
    label: Option<String>,
    parse: Rc<ParseFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            label: self.label.clone(),
            parse: Rc::clone(&self.parse),
        }
    }
}

/// Values that `and` can splice into one flat list.
///
/// A single item contributes itself, a list contributes its elements and an
/// absent optional contributes nothing.
pub trait Sequence {
    type Item;
    fn into_items(self) -> Vec<Self::Item>;
}

impl Sequence for char {
    type Item = char;
    fn into_items(self) -> Vec<char> {
        vec![self]
    }
}

impl Sequence for String {
    type Item = char;
    fn into_items(self) -> Vec<char> {
        self.chars().collect()
    }
}

impl<E> Sequence for Vec<E> {
    type Item = E;
    fn into_items(self) -> Vec<E> {
        self
    }
}

impl<S: Sequence> Sequence for Option<S> {
    type Item = S::Item;
    fn into_items(self) -> Vec<S::Item> {
        self.map(Sequence::into_items).unwrap_or_default()
    }
}

impl<T: 'static> Parser<T> {
    pub fn new<F>(parse: F) -> Self
    where
        F: for<'s> Fn(State<'s>) -> ParseResult<'s, T> + 'static,
    {
        Parser { label: None, parse: Rc::new(parse) }
    }

    fn with_label<F>(label: Option<String>, parse: F) -> Self
    where
        F: for<'s> Fn(State<'s>) -> ParseResult<'s, T> + 'static,
    {
        Parser { label, parse: Rc::new(parse) }
    }

    pub fn run<'s>(&self, state: State<'s>) -> ParseResult<'s, T> {
        (self.parse)(state)
    }

    /// Runs the parser from the start of `input`.
    pub fn parse_str<'s>(&self, input: &'s str) -> ParseResult<'s, T> {
        self.run(State::new(input))
    }

    /// Names this rule. Any failure coming out of it carries `label`.
    pub fn label(self, label: &str) -> Parser<T> {
        let name = label.to_string();
        let inner = self;
        Parser::with_label(Some(name.clone()), move |state| {
            inner.run(state).map_err(|err| err.relabel(&name))
        })
    }

    /// Transforms the success value. A failure is relabeled with this
    /// parser's own label when it has one.
    pub fn map<R, F>(self, f: F) -> Parser<R>
    where
        R: 'static,
        F: Fn(T) -> R + 'static,
    {
        let label = self.label.clone();
        let inner = self;
        Parser::with_label(label.clone(), move |state| match inner.run(state) {
            Ok(Success { value, state }) => Ok(Success::new(f(value), state)),
            Err(err) => Err(match &label {
                Some(label) => err.relabel(label),
                None => err,
            }),
        })
    }

    /// Replaces the success value with a constant.
    pub fn to<R: Clone + 'static>(self, value: R) -> Parser<R> {
        self.map(move |_| value.clone())
    }

    /// Like `map`, but the transformation may reject the value. A rejection
    /// is a syntax error at the position where this parser started.
    pub fn try_map<R, F>(self, f: F) -> Parser<R>
    where
        R: 'static,
        F: Fn(T) -> Result<R, String> + 'static,
    {
        let label = self.label.clone();
        let inner = self;
        Parser::with_label(label, move |start| {
            let Success { value, state } = inner.run(start)?;
            match f(value) {
                Ok(value) => Ok(Success::new(value, state)),
                Err(msg) => Err(ParserError::syntax(&msg, &start)),
            }
        })
    }

    pub fn ignore(self) -> Parser<()> {
        self.map(|_| ())
    }

    pub fn followed_by<U: 'static>(self, that: Parser<U>) -> Parser<(T, U)> {
        let this = self;
        Parser::new(move |state| {
            let first = this.run(state)?;
            let second = that.run(first.state)?;
            Ok(Success::new((first.value, second.value), second.state))
        })
    }

    /// Sequences two parsers and splices both results into one flat list.
    pub fn and<U>(self, that: Parser<U>) -> Parser<Vec<T::Item>>
    where
        T: Sequence,
        T::Item: 'static,
        U: Sequence<Item = T::Item> + 'static,
    {
        self.followed_by(that).map(|(left, right)| {
            let mut items = left.into_items();
            items.extend(right.into_items());
            items
        })
    }

    /// Sequences two parsers, keeping the left value.
    pub fn andl<U: 'static>(self, that: Parser<U>) -> Parser<T> {
        self.followed_by(that).map(|(left, _)| left)
    }

    /// Sequences two parsers, keeping the right value.
    pub fn andr<U: 'static>(self, that: Parser<U>) -> Parser<U> {
        self.followed_by(that).map(|(_, right)| right)
    }

    /// Ordered choice: `that` is tried from the original state only if this
    /// parser fails. When both fail, the failure that got further is kept.
    pub fn or(self, that: Parser<T>) -> Parser<T> {
        let this = self;
        Parser::new(move |state| match this.run(state) {
            Ok(success) => Ok(success),
            Err(first) => that.run(state).map_err(|second| first.furthest(second)),
        })
    }
}

pub fn fail<T: 'static>(label: &str) -> Parser<T> {
    let name = label.to_string();
    Parser::with_label(Some(name.clone()), move |state| Err(ParserError::syntax(&name, &state)))
}

/// Succeeds, consuming nothing, only when the input is exhausted.
pub fn end_of_input() -> Parser<()> {
    Parser::with_label(Some("end-of-input".to_string()), |state| {
        if state.at_end() {
            Ok(Success::new((), state))
        } else {
            Err(ParserError::syntax("end-of-input", &state))
        }
    })
}

/// Consumes one character matching `predicate`.
pub fn satisfy<P>(label: &str, predicate: P) -> Parser<char>
where
    P: Fn(char) -> bool + 'static,
{
    let name = label.to_string();
    Parser::with_label(Some(name.clone()), move |state| match state.current_char() {
        None => Err(ParserError::no_more_input(&name)),
        Some(c) if predicate(c) => Ok(Success::new(c, state.advance())),
        Some(c) => Err(ParserError::unexpected(&name, c, &state)),
    })
}

/// First parser that succeeds wins. When all fail, the failure that got
/// furthest is returned, the later one on a tie.
pub fn choice<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<T> {
    parsers
        .into_iter()
        .reduce(Parser::or)
        .unwrap_or_else(|| fail("choice"))
}

/// Runs every parser in order, splicing the results like `and`.
pub fn sequence<T>(parsers: Vec<Parser<T>>) -> Parser<Vec<T::Item>>
where
    T: Sequence + 'static,
    T::Item: 'static,
{
    let empty: Parser<Vec<T::Item>> = Parser::new(|state| Ok(Success::new(Vec::new(), state)));
    parsers.into_iter().fold(empty, |acc, parser| acc.and(parser))
}

/// Always succeeds; `None` when `parser` fails, consuming nothing.
pub fn optional<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    Parser::new(move |state| match parser.run(state) {
        Ok(Success { value, state }) => Ok(Success::new(Some(value), state)),
        Err(_) => Ok(Success::new(None, state)),
    })
}

/// Applies `parser` until it fails and collects the values. The failing
/// attempt is discarded. An application that consumes no input ends the
/// repetition so a nullable parser cannot loop forever.
pub fn zero_or_more<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |start| {
        let mut values = Vec::new();
        let mut state = start;
        while let Ok(success) = parser.run(state) {
            let progressed = success.state.pos > state.pos;
            values.push(success.value);
            state = success.state;
            if !progressed {
                break;
            }
        }
        Ok(Success::new(values, state))
    })
}

/// Applies `item` until `close` matches. When an item fails and `close`
/// does not match either, the failure that got further is returned, so an
/// error inside an item is not hidden behind the missing `close`.
pub fn repeat_until<T, C>(item: Parser<T>, close: Parser<C>) -> Parser<Vec<T>>
where
    T: 'static,
    C: 'static,
{
    Parser::new(move |start| {
        let mut values = Vec::new();
        let mut state = start;
        loop {
            let item_err = match item.run(state) {
                Ok(success) if success.state.pos > state.pos => {
                    values.push(success.value);
                    state = success.state;
                    continue;
                }
                Ok(_) => ParserError::syntax("repeat", &state),
                Err(err) => err,
            };
            return match close.run(state) {
                Ok(done) => Ok(Success::new(values, done.state)),
                Err(close_err) => Err(item_err.furthest(close_err)),
            };
        }
    })
}

pub fn one_or_more<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    parser
        .clone()
        .followed_by(zero_or_more(parser))
        .map(|(first, rest)| {
            let mut values = Vec::with_capacity(rest.len() + 1);
            values.push(first);
            values.extend(rest);
            values
        })
        .label("one-or-more")
}

pub fn p_char(c: char) -> Parser<char> {
    satisfy(&c.to_string(), move |x| x == c)
}

/// Matches `text` literally. A mismatch is reported as a syntax error at
/// the position where the literal was expected.
pub fn p_string(text: &str) -> Parser<String> {
    let literal = sequence(text.chars().map(p_char).collect()).map(|chars| chars.into_iter().collect::<String>());
    let name = text.to_string();
    Parser::with_label(Some(name.clone()), move |state| {
        literal.run(state).map_err(|err| match err {
            ParserError::NoMoreInput { .. } => ParserError::no_more_input(&name),
            _ => ParserError::syntax(&name, &state),
        })
    })
}

pub fn any_of<I>(chars: I) -> Parser<char>
where
    I: IntoIterator<Item = char>,
{
    let set: Vec<char> = chars.into_iter().collect();
    satisfy("any-of", move |c| set.contains(&c))
}

pub fn between<L, T, R>(left: Parser<L>, middle: Parser<T>, right: Parser<R>) -> Parser<T>
where
    L: 'static,
    T: 'static,
    R: 'static,
{
    left.andr(middle).andl(right).label("between")
}

/// One or more `parser`, separated by `sep`.
pub fn separated_by<T, S>(parser: Parser<T>, sep: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    parser
        .clone()
        .followed_by(zero_or_more(sep.andr(parser)))
        .map(|(first, rest)| {
            let mut values = vec![first];
            values.extend(rest);
            values
        })
}

pub fn delimited2<D, A, B>(delim: &Parser<D>, a: Parser<A>, b: Parser<B>) -> Parser<(A, B)>
where
    D: 'static,
    A: 'static,
    B: 'static,
{
    a.andl(delim.clone()).followed_by(b)
}

pub fn delimited3<D, A, B, C>(delim: &Parser<D>, a: Parser<A>, b: Parser<B>, c: Parser<C>) -> Parser<(A, B, C)>
where
    D: 'static,
    A: 'static,
    B: 'static,
    C: 'static,
{
    delimited2(delim, a, b)
        .andl(delim.clone())
        .followed_by(c)
        .map(|((a, b), c)| (a, b, c))
}

pub fn delimited4<D, A, B, C, E>(
    delim: &Parser<D>,
    a: Parser<A>,
    b: Parser<B>,
    c: Parser<C>,
    d: Parser<E>,
) -> Parser<(A, B, C, E)>
where
    D: 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    E: 'static,
{
    delimited3(delim, a, b, c)
        .andl(delim.clone())
        .followed_by(d)
        .map(|((a, b, c), d)| (a, b, c, d))
}

pub fn delimited5<D, A, B, C, E, F>(
    delim: &Parser<D>,
    a: Parser<A>,
    b: Parser<B>,
    c: Parser<C>,
    d: Parser<E>,
    e: Parser<F>,
) -> Parser<(A, B, C, E, F)>
where
    D: 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    E: 'static,
    F: 'static,
{
    delimited4(delim, a, b, c, d)
        .andl(delim.clone())
        .followed_by(e)
        .map(|((a, b, c, d), e)| (a, b, c, d, e))
}

pub fn delimited6<D, A, B, C, E, F, G>(
    delim: &Parser<D>,
    a: Parser<A>,
    b: Parser<B>,
    c: Parser<C>,
    d: Parser<E>,
    e: Parser<F>,
    f: Parser<G>,
) -> Parser<(A, B, C, E, F, G)>
where
    D: 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    E: 'static,
    F: 'static,
    G: 'static,
{
    delimited5(delim, a, b, c, d, e)
        .andl(delim.clone())
        .followed_by(f)
        .map(|((a, b, c, d, e), f)| (a, b, c, d, e, f))
}
