// Prefix arithmetic evaluator - fully parenthesized, variadic operand lists
//
// expr     ::= '(' operator ' ' expr ' ' expr opt_expr ')' | digit+
// operator ::= '+' | '-' | '*' | '/'
// opt_expr ::= ' ' expr opt_expr | <empty, next byte is ')'>
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(Operator::Add),
            b'-' => Some(Operator::Sub),
            b'*' => Some(Operator::Mul),
            b'/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Fixed-width arithmetic; overflow wraps, division truncates toward zero.
    pub fn apply(self, lhs: i32, rhs: i32) -> Result<i32, ParseError> {
        match self {
            Operator::Add => Ok(lhs.wrapping_add(rhs)),
            Operator::Sub => Ok(lhs.wrapping_sub(rhs)),
            Operator::Mul => Ok(lhs.wrapping_mul(rhs)),
            Operator::Div if rhs == 0 => Err(ParseError::DivisionByZero),
            Operator::Div => Ok(lhs.wrapping_div(rhs)),
        }
    }
}

/// Immutable input plus the offset recognized so far. Recognizers take a
/// cursor by value and hand back the advanced one with their result.
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Cursor { input, offset: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn advance(self, n: usize) -> Self {
        Cursor {
            input: self.input,
            offset: (self.offset + n).min(self.input.len()),
        }
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::UnexpectedByte {
                offset: self.offset,
                found,
            },
            None => ParseError::UnexpectedEnd {
                offset: self.offset,
            },
        }
    }

    fn consume(self, byte: u8) -> Result<Self, ParseError> {
        if self.peek() == Some(byte) {
            Ok(self.advance(1))
        } else {
            Err(self.unexpected())
        }
    }
}

/// Evaluate one complete expression.
///
/// The expression may be followed by a single `\n` and nothing else.
pub fn evaluate(input: &[u8]) -> Result<i32, ParseError> {
    let (value, cursor) = expr(Cursor::new(input))?;
    match cursor.rest() {
        [] | [b'\n'] => Ok(value),
        _ => Err(ParseError::TrailingInput {
            offset: cursor.offset,
        }),
    }
}

fn expr(cursor: Cursor<'_>) -> Result<(i32, Cursor<'_>), ParseError> {
    match cursor.peek() {
        Some(b'(') => application(cursor.advance(1)),
        Some(b) if b.is_ascii_digit() => literal(cursor),
        _ => Err(cursor.unexpected()),
    }
}

// Everything after the opening parenthesis of `(op e1 e2 ...)`.
fn application(cursor: Cursor<'_>) -> Result<(i32, Cursor<'_>), ParseError> {
    let op = cursor
        .peek()
        .and_then(Operator::from_byte)
        .ok_or_else(|| cursor.unexpected())?;
    let cursor = cursor.advance(1).consume(b' ')?;

    let (first, cursor) = expr(cursor)?;
    let cursor = cursor.consume(b' ')?;
    let (second, cursor) = expr(cursor)?;

    let acc = op.apply(first, second)?;
    let (acc, cursor) = fold_operands(cursor, op, acc)?;
    let cursor = cursor.consume(b')')?;
    Ok((acc, cursor))
}

// opt_expr: left fold over any further operands until the closing parenthesis.
fn fold_operands(
    mut cursor: Cursor<'_>,
    op: Operator,
    mut acc: i32,
) -> Result<(i32, Cursor<'_>), ParseError> {
    loop {
        match cursor.peek() {
            Some(b' ') => {
                let (operand, next) = expr(cursor.advance(1))?;
                acc = op.apply(acc, operand)?;
                cursor = next;
            }
            Some(b')') => return Ok((acc, cursor)),
            _ => return Err(cursor.unexpected()),
        }
    }
}

fn literal(cursor: Cursor<'_>) -> Result<(i32, Cursor<'_>), ParseError> {
    let start = cursor.offset;
    let digits = cursor
        .rest()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    let value = cursor.rest()[..digits]
        .iter()
        .try_fold(0i32, |acc, b| {
            acc.checked_mul(10)?.checked_add(i32::from(b - b'0'))
        })
        .ok_or(ParseError::LiteralOutOfRange { offset: start })?;

    let cursor = cursor.advance(digits);
    match cursor.peek() {
        None | Some(b' ') | Some(b')') | Some(b'\n') => Ok((value, cursor)),
        Some(_) => Err(cursor.unexpected()),
    }
}
