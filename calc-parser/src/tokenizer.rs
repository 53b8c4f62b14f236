// Calc Tokenizer
// Cursor over a statement that yields raw token strings and classifies keywords

use crate::operator::OPERATOR_GLYPHS;

/// Byte range of a token within its statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len())
    }
}

/// A raw token: its text and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

pub const QUOTE: char = '"';
pub const ESCAPE: char = '\\';
pub const ASSIGN: &str = "=";

/// Reserved words of the statement grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Leading: `let NAME = ...`
    Let,
    /// Non-leading: opens the local bindings of a statement
    Where,
    /// Non-leading: separates local bindings
    And,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "let" => Some(Keyword::Let),
            "where" => Some(Keyword::Where),
            "and" => Some(Keyword::And),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Let => "let",
            Keyword::Where => "where",
            Keyword::And => "and",
        }
    }

    pub fn is_leading(self) -> bool {
        self == Keyword::Let
    }
}

pub fn is_leading_keyword(word: &str) -> bool {
    Keyword::from_word(word).is_some_and(Keyword::is_leading)
}

pub fn is_non_leading_keyword(word: &str) -> bool {
    Keyword::from_word(word).is_some_and(|keyword| !keyword.is_leading())
}

/// Characters that always end a token and form a token of their own
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '"' | '!' | '<' | '>') || OPERATOR_GLYPHS.contains(c)
}

/// First characters of relational operator tokens
pub fn is_relational_start(text: &str) -> bool {
    matches!(text, "=" | "!" | "<" | ">")
}

pub fn is_operator_glyph(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if OPERATOR_GLYPHS.contains(c))
}

/// Numbers start with a digit or a decimal point and parse completely
pub fn is_number(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}

/// Why a string literal could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedString {
    pub span: Span,
}

/// Cursor over the remaining input of one statement
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Text not yet consumed
    pub fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    /// Move the cursor back so `position` is read again
    pub fn rewind_to(&mut self, position: usize) {
        self.position = position.min(self.source.len());
    }

    /// Extract the next token, skipping leading whitespace
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        let start = self.position + (rest.len() - trimmed.len());
        let first = trimmed.chars().next()?;

        let len = if is_delimiter(first) {
            first.len_utf8()
        } else {
            trimmed.find(is_delimiter).unwrap_or(trimmed.len())
        };

        self.position = start + len;
        Some(Token {
            text: &self.source[start..self.position],
            span: Span::new(start, self.position),
        })
    }

    /// Consume `expected` if it is the very next character (no whitespace skipped)
    pub fn eat_char(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Read the body of a string literal whose opening quote was just consumed.
    ///
    /// On success the cursor sits after the closing quote. On failure the
    /// cursor is left at the end of input.
    pub fn read_string_literal(&mut self) -> Result<String, UnterminatedString> {
        let start = self.position;
        let mut text = String::new();
        let mut chars = self.rest().char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                QUOTE => {
                    self.position = start + offset + QUOTE.len_utf8();
                    return Ok(text);
                }
                ESCAPE => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                _ => text.push(c),
            }
        }

        self.position = self.source.len();
        // The opening quote sits just before `start`
        Err(UnterminatedString {
            span: Span::new(start.saturating_sub(1), self.source.len()),
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Escape a string so that `read_string_literal` returns it unchanged
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            QUOTE => escaped.push_str("\\\""),
            ESCAPE => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        Tokenizer::new(source).map(|token| token.text).collect()
    }

    #[test]
    fn test_splits_on_glyphs_and_whitespace() {
        assert_eq!(texts("2+3 * (x1-4)"), vec!["2", "+", "3", "*", "(", "x1", "-", "4", ")"]);
        assert_eq!(texts("   "), Vec::<&str>::new());
    }

    #[test]
    fn test_relational_glyphs_are_single_characters() {
        assert_eq!(texts("a<=b"), vec!["a", "<", "=", "b"]);
        assert_eq!(texts("a != b"), vec!["a", "!", "=", "b"]);
    }

    #[test]
    fn test_spans_point_into_source() {
        let mut tokens = Tokenizer::new("  foo + 1");
        let foo = tokens.next_token().unwrap();
        assert_eq!(foo.span, Span::new(2, 5));
        let plus = tokens.next_token().unwrap();
        assert_eq!(plus.span, Span::new(6, 7));
    }

    #[test]
    fn test_eat_char_does_not_skip_whitespace() {
        let mut tokens = Tokenizer::new("< =");
        tokens.next_token();
        assert!(!tokens.eat_char('='));

        let mut tokens = Tokenizer::new("<=");
        tokens.next_token();
        assert!(tokens.eat_char('='));
        assert_eq!(tokens.next_token(), None);
    }

    #[test]
    fn test_string_literal_with_escapes() {
        let mut tokens = Tokenizer::new(r#""a \"b\" \\ c" + 1"#);
        assert_eq!(tokens.next_token().unwrap().text, "\"");
        assert_eq!(tokens.read_string_literal().unwrap(), r#"a "b" \ c"#);
        assert_eq!(tokens.next_token().unwrap().text, "+");
    }

    #[test]
    fn test_unterminated_string_literal() {
        let mut tokens = Tokenizer::new("\"abc");
        tokens.next_token();
        let error = tokens.read_string_literal().unwrap_err();
        assert_eq!(error.span, Span::new(0, 4));
        assert_eq!(tokens.next_token(), None);
    }

    #[test]
    fn test_escape_string_round_trips() {
        let original = "say \"hi\"\\\n";
        let quoted = format!("\"{}\"", escape_string(original));
        let mut tokens = Tokenizer::new(&quoted);
        tokens.next_token();
        assert_eq!(tokens.read_string_literal().unwrap(), original);
    }

    #[test]
    fn test_keyword_classification() {
        assert!(is_leading_keyword("let"));
        assert!(!is_leading_keyword("where"));
        assert!(is_non_leading_keyword("where"));
        assert!(is_non_leading_keyword("and"));
        assert!(!is_non_leading_keyword("letter"));
    }

    #[test]
    fn test_number_recognition() {
        assert!(is_number("42"));
        assert!(is_number("3.25"));
        assert!(is_number(".5"));
        assert!(is_number("1e5"));
        assert!(!is_number("inf"));
        assert!(!is_number("x2"));
        assert!(!is_number("2x"));
    }

    #[test]
    fn test_rewind() {
        let mut tokens = Tokenizer::new("a where b");
        tokens.next_token();
        let keyword = tokens.next_token().unwrap();
        tokens.rewind_to(keyword.span.start);
        assert_eq!(tokens.rest(), "where b");
    }
}
