use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::{data_structures::Cell, error},
};
use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    io::Read,
};

/// The structural words of the language.  These are never compiled as instructions themselves,
/// the compiler runs their compile time action instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Keyword {
    Colon,
    Semicolon,
    Begin,
    Until,
    If,
    Else,
    Then,
    Do,
    Leave,
    Loop,
    PlusLoop,
    Again,
    While,
    Repeat,
}

lazy_static! {
    /// Spelling of every keyword, used by the lexer to classify bare names.
    static ref KEYWORDS: HashMap<&'static str, Keyword> = {
        let mut map = HashMap::new();

        for keyword in Keyword::ALL {
            map.insert(keyword.name(), keyword);
        }

        map
    };
}

impl Keyword {
    pub const ALL: [Keyword; 14] = [
        Keyword::Colon,
        Keyword::Semicolon,
        Keyword::Begin,
        Keyword::Until,
        Keyword::If,
        Keyword::Else,
        Keyword::Then,
        Keyword::Do,
        Keyword::Leave,
        Keyword::Loop,
        Keyword::PlusLoop,
        Keyword::Again,
        Keyword::While,
        Keyword::Repeat,
    ];

    /// The source spelling of the keyword.
    pub fn name(self) -> &'static str {
        match self {
            Keyword::Colon => ":",
            Keyword::Semicolon => ";",
            Keyword::Begin => "begin",
            Keyword::Until => "until",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Then => "then",
            Keyword::Do => "do",
            Keyword::Leave => "leave",
            Keyword::Loop => "loop",
            Keyword::PlusLoop => "+loop",
            Keyword::Again => "again",
            Keyword::While => "while",
            Keyword::Repeat => "repeat",
        }
    }

    /// Look up a bare name in the keyword table.
    pub fn from_name(name: &str) -> Option<Keyword> {
        KEYWORDS.get(name).copied()
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single lexical unit of the source along with the location it was found at.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    /// An integer literal.
    Number(SourceLocation, Cell),

    /// A quoted text literal with its escapes already processed.
    Text(SourceLocation, Vec<u8>),

    /// A name to be resolved through the dictionary.
    Word(SourceLocation, String),

    /// One of the structural keywords.
    Keyword(SourceLocation, Keyword),

    /// The source has no more tokens.
    EndOfInput(SourceLocation),

    /// Something that could not be turned into a token, along with the reason why.
    Invalid(SourceLocation, String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Token::Number(_, number) => write!(f, "{}", number),
            Token::Text(_, text) => {
                write!(f, "\"{}\"", String::from_utf8_lossy(text).escape_default())
            }
            Token::Word(_, word) => write!(f, "{}", word),
            Token::Keyword(_, keyword) => write!(f, "{}", keyword),
            Token::EndOfInput(_) => write!(f, "<end of input>"),
            Token::Invalid(_, reason) => write!(f, "<invalid: {}>", reason),
        }
    }
}

impl Token {
    /// Get the token's location in the source text.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Token::Number(location, _)
            | Token::Text(location, _)
            | Token::Word(location, _)
            | Token::Keyword(location, _)
            | Token::EndOfInput(location)
            | Token::Invalid(location, _) => location,
        }
    }
}

/// Check if the given character is considered whitespace.
fn is_whitespace(next: u8) -> bool {
    next == b' ' || next == b'\t' || next == b'\r' || next == b'\n'
}

/// Turns a stream of source bytes into tokens, one token per request.
pub struct Lexer {
    buffer: SourceBuffer,
}

impl Lexer {
    /// Create a lexer over the given source.  The path is only used for locations.
    pub fn new(path: &str, source: Box<dyn Read>) -> Lexer {
        Lexer {
            buffer: SourceBuffer::new(path, source),
        }
    }

    /// Where the lexer currently is in the source.
    pub fn location(&self) -> &SourceLocation {
        self.buffer.location()
    }

    /// Pull the next token out of the source.  Whitespace and comments are skipped.  Only a
    /// failure of the underlying reader is reported as an error, malformed source produces an
    /// `Invalid` token instead.
    pub fn next_token(&mut self) -> error::Result<Token> {
        loop {
            self.skip_whitespace()?;

            let location = self.buffer.location().clone();

            match self.buffer.peek_next()? {
                None => return Ok(Token::EndOfInput(location)),

                Some(b'(') => self.skip_comment()?,

                Some(b'"') => {
                    return match self.process_string()? {
                        Some(text) => Ok(Token::Text(location, text)),
                        None => Ok(Token::Invalid(
                            location,
                            "unterminated string literal".to_string(),
                        )),
                    };
                }

                Some(_) => {
                    let text = self.process_word()?;

                    if text == "\\" {
                        self.skip_line()?;
                        continue;
                    }

                    let token = if let Some(keyword) = Keyword::from_name(&text) {
                        Token::Keyword(location, keyword)
                    } else if let Some(number) = to_numeric(&text) {
                        Token::Number(location, number)
                    } else {
                        Token::Word(location, text)
                    };

                    return Ok(token);
                }
            }
        }
    }

    /// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the
    /// next non-whitespace character.
    fn skip_whitespace(&mut self) -> error::Result<()> {
        while let Some(next) = self.buffer.peek_next()? {
            if !is_whitespace(next) {
                break;
            }

            let _ = self.buffer.next_char()?;
        }

        Ok(())
    }

    /// Skip a parenthesised comment, including the closing parenthesis.  An unclosed comment
    /// simply runs to the end of the source.
    fn skip_comment(&mut self) -> error::Result<()> {
        while let Some(next) = self.buffer.next_char()? {
            if next == b')' {
                break;
            }
        }

        Ok(())
    }

    fn skip_line(&mut self) -> error::Result<()> {
        while let Some(next) = self.buffer.next_char()? {
            if next == b'\n' {
                break;
            }
        }

        Ok(())
    }

    /// Pull text out of the buffer until whitespace, the start of a comment, or the end of the
    /// source.
    fn process_word(&mut self) -> error::Result<String> {
        let mut bytes = Vec::new();

        while let Some(next) = self.buffer.peek_next()? {
            if is_whitespace(next) || next == b'(' {
                break;
            }

            bytes.push(next);
            let _ = self.buffer.next_char()?;
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Process a quoted text literal.  Returns None if the source ended before the closing quote.
    fn process_string(&mut self) -> error::Result<Option<Vec<u8>>> {
        // Consume the opening quote.
        let _ = self.buffer.next_char()?;
        let mut bytes = Vec::new();

        loop {
            match self.buffer.next_char()? {
                None => return Ok(None),
                Some(b'"') => break,
                Some(b'\\') => match self.buffer.next_char()? {
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(b'"') => bytes.push(b'"'),

                    // Not a known escape, keep it as written.
                    Some(other) => {
                        bytes.push(b'\\');
                        bytes.push(other);
                    }

                    None => return Ok(None),
                },
                Some(next) => bytes.push(next),
            }
        }

        Ok(Some(bytes))
    }
}

/// Attempt to convert the text into an integer literal.  Decimal, hexadecimal (`0x`) and binary
/// (`0b`) are accepted with an optional leading minus sign, and `_` may be used as a separator for
/// readability.
fn to_numeric(text: &str) -> Option<Cell> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let digits = digits.replace('_', "");

    let magnitude = if let Some(stripped) = digits.strip_prefix("0x") {
        u64::from_str_radix(stripped, 16).ok()?
    } else if let Some(stripped) = digits.strip_prefix("0b") {
        u64::from_str_radix(stripped, 2).ok()?
    } else {
        digits.parse::<u64>().ok()?
    };

    if negative {
        if magnitude > i64::MIN.unsigned_abs() {
            return None;
        }

        Some(0_i64.wrapping_sub(magnitude as i64))
    } else {
        i64::try_from(magnitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new("<test>", Box::new(Cursor::new(source.to_string())));
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token().unwrap();
            let done = matches!(token, Token::EndOfInput(_) | Token::Invalid(_, _));

            tokens.push(token);

            if done {
                return tokens;
            }
        }
    }

    fn shapes(source: &str) -> Vec<String> {
        tokenize(source)
            .iter()
            .map(|token| match token {
                Token::Number(_, n) => format!("n:{}", n),
                Token::Text(_, t) => format!("t:{}", String::from_utf8_lossy(t)),
                Token::Word(_, w) => format!("w:{}", w),
                Token::Keyword(_, k) => format!("k:{}", k),
                Token::EndOfInput(_) => "eof".to_string(),
                Token::Invalid(_, _) => "invalid".to_string(),
            })
            .collect()
    }

    #[test]
    fn classifies_numbers_words_and_keywords() {
        assert_eq!(
            shapes(": sq dup * ; -5 - 1+ 0x1f 0b101 1_000 +loop"),
            vec![
                "k::", "w:sq", "w:dup", "w:*", "k:;", "n:-5", "w:-", "w:1+", "n:31", "n:5",
                "n:1000", "k:+loop", "eof"
            ]
        );
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            shapes("1 ( a comment ) 2 foo(inline)bar \\ rest of line\n3"),
            vec!["n:1", "n:2", "w:foo", "w:bar", "n:3", "eof"]
        );
    }

    #[test]
    fn processes_string_escapes() {
        assert_eq!(
            shapes(r#""a\tb\n\\\"q\x""#),
            vec!["t:a\tb\n\\\"q\\x", "eof"]
        );
    }

    #[test]
    fn unterminated_string_is_invalid() {
        assert_eq!(shapes("1 \"open"), vec!["n:1", "invalid"]);
    }

    #[test]
    fn number_limits() {
        assert_eq!(to_numeric("9223372036854775807"), Some(i64::MAX));
        assert_eq!(to_numeric("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(to_numeric("9223372036854775808"), None);
        assert_eq!(to_numeric("-"), None);
        assert_eq!(to_numeric("_1"), None);
    }

    #[test]
    fn tokens_carry_line_numbers() {
        let tokens = tokenize("1\n\n  foo");

        assert_eq!(tokens[1].location().line(), 3);
        assert_eq!(tokens[1].location().column(), 3);
    }

    #[test]
    fn text_keeps_bytes_that_are_not_utf8() {
        let source = b"\"a\xff\xfeb\\n\"".to_vec();
        let mut lexer = Lexer::new("<test>", Box::new(Cursor::new(source)));

        match lexer.next_token().unwrap() {
            Token::Text(_, text) => assert_eq!(text, b"a\xff\xfeb\n".to_vec()),
            other => panic!("expected text, found {}", other),
        }
    }
}
