use std::borrow::Cow;

use rstest::rstest;

use super::*;
use crate::error::{LexError, StringError};

fn single(input: &str) -> Result<Token<'_>, LexError> {
    next_token(input.as_bytes(), 0).map(|(token, _)| token)
}

#[test]
fn punctuation_and_literals() {
    let tokens = tokenize(b" { } [ ] : , true false null ").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::BeginObject,
            Token::EndObject,
            Token::BeginArray,
            Token::EndArray,
            Token::Colon,
            Token::Comma,
            Token::True,
            Token::False,
            Token::Null,
            Token::Eof,
        ]
    );
}

#[test]
fn next_token_reports_new_position() {
    let input = b"\t\r\n [1]";
    let (token, pos) = next_token(input, 0).unwrap();
    assert_eq!(token, Token::BeginArray);
    assert_eq!(pos, 5);
    let (token, pos) = next_token(input, pos).unwrap();
    assert_eq!(token, Token::Number("1"));
    assert_eq!(pos, 6);
    let (token, pos) = next_token(input, pos).unwrap();
    assert_eq!(token, Token::EndArray);
    assert_eq!(next_token(input, pos).unwrap(), (Token::Eof, input.len()));
}

#[test]
fn lexer_reports_token_start() {
    let mut lexer = Lexer::new(b"  \"ab\"  7");
    assert_eq!(lexer.next_token().unwrap(), (Token::String("ab".into()), 2));
    assert_eq!(lexer.next_token().unwrap(), (Token::Number("7"), 8));
    assert!(lexer.is_exhausted());
}

#[rstest]
#[case("0")]
#[case("-0")]
#[case("42")]
#[case("007")]
#[case("3.14000")]
#[case("-12.5e10")]
#[case("1E+2")]
#[case("6.02e-23")]
#[case("123456789012345678901234567890")]
fn numbers_are_returned_as_raw_lexemes(#[case] input: &str) {
    assert_eq!(single(input).unwrap(), Token::Number(input));
}

#[rstest]
#[case("-", 1)]
#[case("1.", 2)]
#[case("1.e5", 2)]
#[case("1e", 2)]
#[case("1e+", 3)]
#[case("-x", 1)]
fn malformed_numbers(#[case] input: &str, #[case] offset: usize) {
    assert_eq!(single(input), Err(LexError::InvalidNumber { offset }));
}

#[test]
fn number_stops_at_delimiter() {
    assert_eq!(next_token(b"12,", 0).unwrap(), (Token::Number("12"), 2));
    assert_eq!(next_token(b"1.5]", 0).unwrap(), (Token::Number("1.5"), 3));
}

#[test]
fn plain_strings_are_borrowed() {
    let token = single(r#""hello wörld""#).unwrap();
    assert!(matches!(token, Token::String(Cow::Borrowed("hello wörld"))));
}

#[rstest]
#[case(r#""a\"b""#, "a\"b")]
#[case(r#""\\\/""#, "\\/")]
#[case(r#""\b\f\n\r\t""#, "\u{8}\u{c}\n\r\t")]
#[case(r#""\u0041\u00e9""#, "Aé")]
#[case(r#""x\ud83d\ude00y""#, "x😀y")]
#[case(r#""pre \u2028 post""#, "pre \u{2028} post")]
fn escapes_are_decoded(#[case] input: &str, #[case] expected: &str) {
    let token = single(input).unwrap();
    assert!(matches!(token, Token::String(Cow::Owned(_))));
    assert_eq!(token, Token::String(expected.into()));
}

#[rstest]
#[case(r#""abc"#, 0, StringError::Unterminated)]
#[case(r#""a\"#, 0, StringError::Unterminated)]
#[case(r#""a\q""#, 3, StringError::InvalidEscape(b'q'))]
#[case(r#""\u00g0""#, 5, StringError::InvalidUnicodeEscape)]
#[case(r#""\ud83d""#, 2, StringError::UnpairedSurrogate(0xD83D))]
#[case(r#""\ud83dA""#, 2, StringError::UnpairedSurrogate(0xD83D))]
#[case(r#""\ude00""#, 2, StringError::UnpairedSurrogate(0xDE00))]
#[case("\"a\nb\"", 2, StringError::ControlCharacter(b'\n'))]
fn invalid_strings(#[case] input: &str, #[case] offset: usize, #[case] reason: StringError) {
    assert_eq!(single(input), Err(LexError::InvalidString { offset, reason }));
}

#[test]
fn invalid_utf8_in_string() {
    let input = b"\"ab\xFFcd\"";
    assert_eq!(
        next_token(input, 0),
        Err(LexError::InvalidString {
            offset: 3,
            reason: StringError::InvalidUtf8,
        })
    );
}

#[rstest]
#[case("tru", LexError::UnexpectedEndOfInput { offset: 3 })]
#[case("nul", LexError::UnexpectedEndOfInput { offset: 3 })]
#[case("trUe", LexError::UnexpectedCharacter { offset: 2, byte: b'U' })]
#[case("fals!", LexError::UnexpectedCharacter { offset: 4, byte: b'!' })]
#[case("@", LexError::UnexpectedCharacter { offset: 0, byte: b'@' })]
#[case("'a'", LexError::UnexpectedCharacter { offset: 0, byte: b'\'' })]
#[case("\u{a0}1", LexError::UnexpectedCharacter { offset: 0, byte: 0xC2 })]
fn bad_literals_and_bytes(#[case] input: &str, #[case] expected: LexError) {
    assert_eq!(single(input), Err(expected));
}

#[test]
fn token_kinds_render_for_errors() {
    assert_eq!(Token::True.kind().to_string(), "boolean");
    assert_eq!(Token::Number("1").kind().to_string(), "number");
    assert_eq!(Token::Colon.kind().to_string(), "':'");
    assert_eq!(Token::Eof.kind().to_string(), "end of input");
}
