//! Textual call-syntax parser.
//!
//! ```text
//! call          := identifier '(' args? ')'
//! args          := arg (',' arg)* ','?
//! arg           := call | literal
//! literal       := quoted-string | bare-token | list | map
//! list          := '[' (literal (',' literal)* ','?)? ']'
//! map           := '{' (key ':' literal (',' key ':' literal)* ','?)? '}'
//! key           := quoted-string | bare-token
//! quoted-string := "'" chars "'" | '"' chars '"'
//! ```
//!
//! The parser produces the generic array form (`["name", arg, ...]`) and
//! never looks at operator names or arity; that is left to the factory.
//! Nesting of calls, lists and maps is capped at a configurable depth.

use crate::stringify;
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("input is not valid UTF-8")]
    InvalidUtf8,
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unclosed string starting at offset {0}")]
    UnclosedString(usize),
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("unclosed comment starting at offset {0}")]
    UnclosedComment(usize),
    #[error("unbalanced ')' at offset {0}")]
    UnbalancedParen(usize),
    #[error("expected exactly one call expression")]
    ExpectedCall,
    #[error("nesting exceeds {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
    #[error("list argument at offset {0} starts with a string and would read as a call")]
    CallShapedList(usize),
}

/// Nesting depth accepted by [`parse`] and [`parse_str`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    OpenList,
    CloseList,
    OpenMap,
    CloseMap,
    Colon,
    Comma,
    Quoted(String),
    Bare(&'a str),
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Open => "'('".to_string(),
            Token::Close => "')'".to_string(),
            Token::OpenList => "'['".to_string(),
            Token::CloseList => "']'".to_string(),
            Token::OpenMap => "'{'".to_string(),
            Token::CloseMap => "'}'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Quoted(s) => format!("string {:?}", s),
            Token::Bare(s) => format!("token {:?}", s),
        }
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<(Token<'a>, usize)>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            pos: 0,
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Option<(Token<'a>, usize)>, ParseError> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(Some(peeked));
        }
        self.scan()
    }

    fn peek(&mut self) -> Result<Option<&Token<'a>>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked.as_ref().map(|(token, _)| token))
    }

    fn scan(&mut self) -> Result<Option<(Token<'a>, usize)>, ParseError> {
        self.skip_trivia()?;
        let start = self.pos;
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = match c {
            '(' => {
                self.advance();
                Token::Open
            }
            ')' => {
                self.advance();
                Token::Close
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '[' => {
                self.advance();
                Token::OpenList
            }
            ']' => {
                self.advance();
                Token::CloseList
            }
            '{' => {
                self.advance();
                Token::OpenMap
            }
            '}' => {
                self.advance();
                Token::CloseMap
            }
            ':' => {
                self.advance();
                Token::Colon
            }
            '\'' | '"' => Token::Quoted(self.scan_string()?),
            _ => {
                while let Some(c) = self.peek_char() {
                    if is_delimiter(c) || self.at_comment() {
                        break;
                    }
                    self.advance();
                }
                Token::Bare(&self.input[start..self.pos])
            }
        };
        Ok(Some((token, start)))
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('/') if self.rest().starts_with("//") => {
                    while let Some(c) = self.peek_char() {
                        self.advance();
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.rest().starts_with("/*") => {
                    let start = self.pos;
                    match self.rest()[2..].find("*/") {
                        Some(end) => self.pos += end + 4,
                        None => return Err(ParseError::UnclosedComment(start)),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let quote = self.peek_char().ok_or(ParseError::UnexpectedEnd)?;
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek_char() {
                None => return Err(ParseError::UnclosedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    let escape_at = self.pos;
                    self.advance();
                    let c = self
                        .peek_char()
                        .ok_or(ParseError::UnclosedString(start))?;
                    self.advance();
                    match c {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        'b' => result.push('\u{8}'),
                        'f' => result.push('\u{c}'),
                        '0' => result.push('\0'),
                        '\\' | '\'' | '"' | '/' => result.push(c),
                        'u' => result.push(self.scan_unicode(escape_at)?),
                        _ => return Err(ParseError::InvalidEscape(escape_at)),
                    }
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Reads the `XXXX` of a `\uXXXX` escape, joining surrogate pairs.
    fn scan_unicode(&mut self, escape_at: usize) -> Result<char, ParseError> {
        let high = self.scan_hex4(escape_at)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or(ParseError::InvalidEscape(escape_at));
        }
        if !self.rest().starts_with("\\u") {
            return Err(ParseError::InvalidEscape(escape_at));
        }
        self.pos += 2;
        let low = self.scan_hex4(escape_at)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(ParseError::InvalidEscape(escape_at));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or(ParseError::InvalidEscape(escape_at))
    }

    fn scan_hex4(&mut self, escape_at: usize) -> Result<u32, ParseError> {
        let digits = self
            .rest()
            .get(..4)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(ParseError::InvalidEscape(escape_at))?;
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidEscape(escape_at))?;
        self.pos += 4;
        Ok(code)
    }

    fn at_comment(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("//") || rest.starts_with("/*")
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ':' | ',' | '\'' | '"')
}

/// Interprets a bare token: a float when it reads as one, a boolean for
/// `true`/`false`, null for `nil`, otherwise the identifier text itself.
fn bare_literal(token: &str) -> Json {
    match token {
        "true" => return Json::Bool(true),
        "false" => return Json::Bool(false),
        "nil" => return Json::Null,
        _ => {}
    }
    if looks_numeric(token) {
        if let Some(n) = token
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
        {
            return Json::Number(n);
        }
    }
    Json::String(token.to_string())
}

/// Rules out words such as `inf` or `NaN` that `f64::from_str` accepts.
fn looks_numeric(token: &str) -> bool {
    let digits = token.trim_start_matches(['+', '-']);
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

/// Where the next token sits inside a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    /// Just after an opener or `,`: a value or the closer may follow.
    Argument,
    /// Just after a value: `,` or the closer must follow.
    Separator,
    /// Inside a map, where an entry key or `}` is expected.
    Key,
    /// Just after a map key.
    Colon,
}

enum Content {
    /// The synthetic bottom frame collecting top-level calls.
    Root(Vec<Json>),
    Call(Vec<Json>),
    List(Vec<Json>),
    Map(serde_json::Map<String, Json>, Option<String>),
}

struct Frame {
    content: Content,
    slot: Slot,
    offset: usize,
}

impl Frame {
    fn new(content: Content, offset: usize) -> Self {
        let slot = match content {
            Content::Map(..) => Slot::Key,
            _ => Slot::Argument,
        };
        Frame {
            content,
            slot,
            offset,
        }
    }

    fn accepts_call(&self) -> bool {
        self.slot == Slot::Argument
            && matches!(self.content, Content::Root(_) | Content::Call(_))
    }

    fn accepts_literal(&self) -> bool {
        self.slot == Slot::Argument && !matches!(self.content, Content::Root(_))
    }

    fn push(&mut self, value: Json) {
        match &mut self.content {
            Content::Root(items) => {
                items.push(value);
                return;
            }
            Content::Call(items) | Content::List(items) => items.push(value),
            Content::Map(entries, key) => {
                if let Some(key) = key.take() {
                    entries.insert(key, value);
                }
            }
        }
        self.slot = Slot::Separator;
    }

    fn set_key(&mut self, name: String) {
        if let Content::Map(_, key) = &mut self.content {
            *key = Some(name);
            self.slot = Slot::Colon;
        }
    }

    /// Whether `closer` ends this frame in its current state.
    fn closes_with(&self, closer: &Token<'_>) -> bool {
        match (&self.content, closer) {
            (Content::Call(_), Token::Close) | (Content::List(_), Token::CloseList) => {
                matches!(self.slot, Slot::Argument | Slot::Separator)
            }
            (Content::Map(..), Token::CloseMap) => {
                matches!(self.slot, Slot::Key | Slot::Separator)
            }
            _ => false,
        }
    }

    fn into_value(self) -> Json {
        match self.content {
            Content::Root(items) | Content::Call(items) | Content::List(items) => {
                Json::Array(items)
            }
            Content::Map(entries, _) => Json::Object(entries),
        }
    }
}

fn open(
    stack: &mut Vec<Frame>,
    content: Content,
    offset: usize,
    limit: usize,
) -> Result<(), ParseError> {
    // The root frame does not count towards the limit.
    if stack.len() > limit {
        return Err(ParseError::TooDeep { offset, limit });
    }
    stack.push(Frame::new(content, offset));
    Ok(())
}

fn close(stack: &mut Vec<Frame>, closer: Token<'_>, offset: usize) -> Result<(), ParseError> {
    let unexpected = || ParseError::UnexpectedToken {
        found: closer.describe(),
        offset,
    };
    match stack.last() {
        Some(frame) if frame.closes_with(&closer) => {}
        Some(Frame {
            content: Content::Root(_),
            ..
        }) if closer == Token::Close => return Err(ParseError::UnbalancedParen(offset)),
        _ => return Err(unexpected()),
    }
    let done = stack.pop().ok_or(ParseError::UnbalancedParen(offset))?;
    let parent = stack.last_mut().ok_or(ParseError::UnbalancedParen(offset))?;
    let is_list = matches!(done.content, Content::List(_));
    let list_offset = done.offset;
    let value = done.into_value();
    // A list argument shaped like a call would be resolved as one.
    if is_list && matches!(parent.content, Content::Call(_)) {
        if let Json::Array(items) = &value {
            if matches!(items.first(), Some(Json::String(_))) {
                return Err(ParseError::CallShapedList(list_offset));
            }
        }
    }
    parent.push(value);
    Ok(())
}

/// Parses UTF-8 source bytes into the generic array form.
pub fn parse(input: &[u8]) -> Result<Json, ParseError> {
    let text = std::str::from_utf8(input).map_err(|_| ParseError::InvalidUtf8)?;
    parse_str(text)
}

/// Parses source text into the generic array form.
pub fn parse_str(input: &str) -> Result<Json, ParseError> {
    parse_str_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parses source text, failing with [`ParseError::TooDeep`] once calls,
/// lists and maps nest deeper than `max_depth`.
pub fn parse_str_with_max_depth(input: &str, max_depth: usize) -> Result<Json, ParseError> {
    let mut scanner = Scanner::new(input);
    let mut stack = vec![Frame::new(Content::Root(Vec::new()), 0)];

    while let Some((token, offset)) = scanner.next()? {
        let unexpected = |token: &Token<'_>| ParseError::UnexpectedToken {
            found: token.describe(),
            offset,
        };
        let frame = stack
            .last_mut()
            .ok_or(ParseError::UnbalancedParen(offset))?;

        match token {
            Token::Bare(name) if scanner.peek()? == Some(&Token::Open) => {
                if !frame.accepts_call() {
                    return Err(unexpected(&Token::Bare(name)));
                }
                scanner.next()?;
                let call = Content::Call(vec![Json::String(name.to_string())]);
                open(&mut stack, call, offset, max_depth)?;
            }
            Token::Bare(name) if frame.slot == Slot::Key => frame.set_key(name.to_string()),
            Token::Quoted(name) if frame.slot == Slot::Key => frame.set_key(name),
            Token::Bare(_) | Token::Quoted(_) | Token::OpenList | Token::OpenMap
                if !frame.accepts_literal() =>
            {
                let found = match &token {
                    Token::Bare(text) => {
                        format!("literal {}", stringify::generic(&bare_literal(text)))
                    }
                    other => other.describe(),
                };
                return Err(ParseError::UnexpectedToken { found, offset });
            }
            Token::Bare(text) => frame.push(bare_literal(text)),
            Token::Quoted(text) => frame.push(Json::String(text)),
            Token::OpenList => open(&mut stack, Content::List(Vec::new()), offset, max_depth)?,
            Token::OpenMap => {
                let map = Content::Map(serde_json::Map::new(), None);
                open(&mut stack, map, offset, max_depth)?;
            }
            Token::Colon => {
                if frame.slot != Slot::Colon {
                    return Err(unexpected(&token));
                }
                frame.slot = Slot::Argument;
            }
            Token::Comma => {
                if frame.slot != Slot::Separator {
                    return Err(unexpected(&token));
                }
                frame.slot = match frame.content {
                    Content::Map(..) => Slot::Key,
                    _ => Slot::Argument,
                };
            }
            Token::Close | Token::CloseList | Token::CloseMap => close(&mut stack, token, offset)?,
            Token::Open => return Err(unexpected(&token)),
        }
    }

    if stack.len() != 1 {
        return Err(ParseError::UnexpectedEnd);
    }
    let root = match stack.pop().map(|frame| frame.content) {
        Some(Content::Root(items)) => items,
        _ => Vec::new(),
    };
    match <[Json; 1]>::try_from(root) {
        Ok([call]) => Ok(call),
        Err(_) => Err(ParseError::ExpectedCall),
    }
}
