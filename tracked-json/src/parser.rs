//! Span-preserving JSON parser.
//!
//! Every node of the output tree carries the byte span of its source token,
//! and object keys keep the span of their quoted key token. String escapes
//! are decoded into the value; the span still covers the raw token, quotes
//! included.

use chumsky::prelude::*;

/// A value paired with the byte span of the source token it was parsed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub span: SimpleSpan<usize>,
    pub val: T,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Str(String),
    Num(f64),
    Array(Vec<Spanned<Json>>),
    /// Members in source order. Duplicate keys are retained here so callers
    /// can decide how to treat semantically malformed (but parseable) input.
    Object(Vec<(Spanned<String>, Spanned<Json>)>),
}

/// Adapted from: <https://github.com/zesterer/chumsky/blob/main/examples/json.rs>.
pub fn parser<'a>() -> impl Parser<'a, &'a str, Spanned<Json>, extra::Err<Rich<'a, char>>> {
    recursive(|value| {
        let digits = text::digits(10).to_slice();

        let frac = just('.').then(digits);

        let exp = just('e')
            .or(just('E'))
            .then(one_of("+-").or_not())
            .then(digits)
            .labelled("exponent");

        let number = just('-')
            .or_not()
            .then(text::int(10))
            .then(frac.or_not())
            .then(exp.or_not())
            .to_slice()
            .map(|s: &str| s.parse().unwrap_or(f64::NAN))
            .boxed()
            .labelled("number");

        let escape = just('\\')
            .ignore_then(choice((
                just('\\'),
                just('/'),
                just('"'),
                just('b').to('\x08'),
                just('f').to('\x0C'),
                just('n').to('\n'),
                just('r').to('\r'),
                just('t').to('\t'),
                just('u').ignore_then(text::digits(16).exactly(4).to_slice().validate(
                    |digits, e, emitter| {
                        char::from_u32(u32::from_str_radix(digits, 16).unwrap()).unwrap_or_else(
                            || {
                                emitter.emit(Rich::custom(e.span(), "invalid unicode character"));
                                '\u{FFFD}' // unicode replacement character
                            },
                        )
                    },
                )),
            )))
            .boxed()
            .labelled("escape character");

        let string = none_of("\\\"")
            .or(escape)
            .repeated()
            .collect::<String>()
            .delimited_by(just('"'), just('"'))
            .map_with(|val, e| Spanned {
                span: e.span(),
                val,
            })
            .boxed()
            .labelled("string");

        let array = value
            .clone()
            .separated_by(just(',').padded())
            .collect::<Vec<_>>()
            .padded()
            .delimited_by(just('['), just(']'))
            .boxed()
            .labelled("array");

        let member = string
            .clone()
            .then_ignore(just(':').padded())
            .then(value)
            .labelled("object member");
        let object = member
            .separated_by(just(',').padded())
            .collect::<Vec<_>>()
            .padded()
            .delimited_by(just('{'), just('}'))
            .boxed()
            .labelled("object");

        choice((
            just("null").to(Json::Null).labelled("null"),
            just("true").to(Json::Bool(true)).labelled("true"),
            just("false").to(Json::Bool(false)).labelled("false"),
            number.map(Json::Num),
            string.map(|s| Json::Str(s.val)),
            array.map(Json::Array),
            object.map(Json::Object),
        ))
        .map_with(|val, e| Spanned {
            span: e.span(),
            val,
        })
        .padded()
    })
    .labelled("JSON value")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Spanned<Json> {
        parser().parse(text).into_result().expect("valid JSON")
    }

    #[test]
    fn value_spans_cover_their_tokens() {
        let text = r#"{"a": 10, "b": [true, null]}"#;
        let root = parse(text);
        assert_eq!(&text[root.span.start..root.span.end], text);

        let Json::Object(members) = root.val else {
            panic!("expected an object");
        };
        let (a_key, a_val) = &members[0];
        assert_eq!(&text[a_key.span.start..a_key.span.end], "\"a\"");
        assert_eq!(&text[a_val.span.start..a_val.span.end], "10");

        let (_, b_val) = &members[1];
        assert_eq!(&text[b_val.span.start..b_val.span.end], "[true, null]");
        let Json::Array(items) = &b_val.val else {
            panic!("expected an array");
        };
        assert_eq!(&text[items[0].span.start..items[0].span.end], "true");
        assert_eq!(&text[items[1].span.start..items[1].span.end], "null");
    }

    #[test]
    fn root_span_excludes_padding() {
        let text = "  {}  ";
        let root = parse(text);
        assert_eq!((root.span.start, root.span.end), (2, 4));
    }

    #[test]
    fn string_escapes_are_decoded() {
        let root = parse(r#""a\nbA\"""#);
        assert_eq!(root.val, Json::Str("a\nbA\"".to_string()));
    }

    #[test]
    fn booleans_and_numbers_are_distinct() {
        assert!(matches!(parse("true").val, Json::Bool(true)));
        assert!(matches!(parse("1").val, Json::Num(_)));
        assert!(matches!(parse("-2.5e3").val, Json::Num(_)));
    }

    #[test]
    fn bare_words_are_rejected_with_a_span() {
        let errors: Vec<_> = parser()
            .parse(r#"{"invalid": json}"#)
            .into_errors()
            .into_iter()
            .collect();
        assert!(!errors.is_empty());
        assert_eq!(errors[0].span().start, 12);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parser().parse("{} nonsense").has_errors());
        assert!(parser().parse("").has_errors());
    }
}
