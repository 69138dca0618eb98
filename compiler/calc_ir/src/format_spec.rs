//! Format specification parser for f-string interpolation and `format()`.
//!
//! Parses the mini-language
//! `[[fill]align][sign][z][#][0][width][grouping][.precision][type]`
//! used in `f"{value:>10.2f}"`. The parsed result is applied by the
//! evaluator's formatting routines.

use std::fmt;

/// Parsed format specification.
///
/// All fields are optional; an empty spec produces [`ParsedFormatSpec::EMPTY`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedFormatSpec {
    /// Padding character (default: space).
    pub fill: Option<char>,
    /// Alignment direction.
    pub align: Option<Align>,
    /// Sign display for numbers.
    pub sign: Option<Sign>,
    /// `z`: coerce negative zero to positive zero.
    pub coerce_zero: bool,
    /// Alternate form (`#`): adds `0b`/`0o`/`0x` prefix.
    pub alternate: bool,
    /// Zero-pad (`0`): pads with zeros after the sign.
    pub zero_pad: bool,
    /// Minimum field width.
    pub width: Option<usize>,
    /// Thousands separator (`,` or `_`).
    pub grouping: Option<char>,
    /// Digits after the point (floats) or max length (strings).
    pub precision: Option<usize>,
    /// Presentation type.
    pub format_type: Option<FormatType>,
}

impl ParsedFormatSpec {
    /// An empty spec with no formatting options set.
    pub const EMPTY: Self = Self {
        fill: None,
        align: None,
        sign: None,
        coerce_zero: false,
        alternate: false,
        zero_pad: false,
        width: None,
        grouping: None,
        precision: None,
        format_type: None,
    };
}

/// Alignment direction for field padding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Align {
    /// `<`: pad on the right.
    Left,
    /// `^`: pad equally on both sides.
    Center,
    /// `>`: pad on the left.
    Right,
    /// `=`: pad between the sign and the digits.
    AfterSign,
}

/// Sign display mode for numeric values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `+`: always show sign.
    Plus,
    /// `-`: show sign only for negatives.
    Minus,
    /// ` `: space for positive, `-` for negative.
    Space,
}

/// Presentation type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// `b`
    Binary,
    /// `c`
    Char,
    /// `d`
    Decimal,
    /// `o`
    Octal,
    /// `x`
    Hex,
    /// `X`
    HexUpper,
    /// `n`
    Number,
    /// `e`
    Exp,
    /// `E`
    ExpUpper,
    /// `f`
    Fixed,
    /// `F`
    FixedUpper,
    /// `g`
    General,
    /// `G`
    GeneralUpper,
    /// `%`
    Percent,
    /// `s`
    Str,
}

impl FormatType {
    /// Returns `true` if this type only applies to integers.
    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Char | Self::Decimal | Self::Octal | Self::Hex | Self::HexUpper
        )
    }

    /// The presentation character, for error messages.
    pub fn as_char(self) -> char {
        match self {
            Self::Binary => 'b',
            Self::Char => 'c',
            Self::Decimal => 'd',
            Self::Octal => 'o',
            Self::Hex => 'x',
            Self::HexUpper => 'X',
            Self::Number => 'n',
            Self::Exp => 'e',
            Self::ExpUpper => 'E',
            Self::Fixed => 'f',
            Self::FixedUpper => 'F',
            Self::General => 'g',
            Self::GeneralUpper => 'G',
            Self::Percent => '%',
            Self::Str => 's',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'b' => Self::Binary,
            'c' => Self::Char,
            'd' => Self::Decimal,
            'o' => Self::Octal,
            'x' => Self::Hex,
            'X' => Self::HexUpper,
            'n' => Self::Number,
            'e' => Self::Exp,
            'E' => Self::ExpUpper,
            'f' => Self::Fixed,
            'F' => Self::FixedUpper,
            'g' => Self::General,
            'G' => Self::GeneralUpper,
            '%' => Self::Percent,
            's' => Self::Str,
            _ => return None,
        })
    }
}

/// Error from parsing a format specification string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatSpecError {
    /// Unknown presentation type or trailing garbage.
    Invalid,
    /// Width or precision does not fit in `usize`.
    TooLarge,
    /// Both `,` and `_` were given.
    MultipleGrouping,
}

impl fmt::Display for FormatSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "Invalid format specifier"),
            Self::TooLarge => write!(f, "Too many decimal digits in format string"),
            Self::MultipleGrouping => write!(f, "Cannot specify both ',' and '_'."),
        }
    }
}

impl std::error::Error for FormatSpecError {}

/// Parse a format specification string.
///
/// ```text
/// parse_format_spec(">10")     // align=Right, width=10
/// parse_format_spec("08x")     // zero_pad, width=8, type=Hex
/// parse_format_spec("*^20.5f") // fill='*', align=Center, width=20, precision=5
/// parse_format_spec(",d")      // grouping=',', type=Decimal
/// ```
pub fn parse_format_spec(spec: &str) -> Result<ParsedFormatSpec, FormatSpecError> {
    if spec.is_empty() {
        return Ok(ParsedFormatSpec::EMPTY);
    }

    let mut result = ParsedFormatSpec::EMPTY;
    let chars: Vec<char> = spec.chars().collect();
    let mut pos = 0;

    // [[fill]align]: if chars[1] is an alignment char, chars[0] is the fill.
    if chars.len() >= 2 && parse_align(chars[1]).is_some() {
        result.fill = Some(chars[0]);
        result.align = parse_align(chars[1]);
        pos = 2;
    } else if let Some(align) = parse_align(chars[0]) {
        result.align = Some(align);
        pos = 1;
    }

    // [sign]
    if let Some(&c) = chars.get(pos) {
        let sign = match c {
            '+' => Some(Sign::Plus),
            '-' => Some(Sign::Minus),
            ' ' => Some(Sign::Space),
            _ => None,
        };
        if sign.is_some() {
            result.sign = sign;
            pos += 1;
        }
    }

    // [z]
    if chars.get(pos) == Some(&'z') {
        result.coerce_zero = true;
        pos += 1;
    }

    // [#]
    if chars.get(pos) == Some(&'#') {
        result.alternate = true;
        pos += 1;
    }

    // [0]
    if chars.get(pos) == Some(&'0') {
        result.zero_pad = true;
        pos += 1;
    }

    // [width]
    let (width, next) = parse_number(&chars, pos)?;
    result.width = width;
    pos = next;

    // [grouping]
    if let Some(&c) = chars.get(pos) {
        if c == ',' || c == '_' {
            result.grouping = Some(c);
            pos += 1;
            if matches!(chars.get(pos), Some(',' | '_')) {
                return Err(FormatSpecError::MultipleGrouping);
            }
        }
    }

    // [.precision]
    if chars.get(pos) == Some(&'.') {
        let (precision, next) = parse_number(&chars, pos + 1)?;
        // `.` must be followed by digits.
        if precision.is_none() {
            return Err(FormatSpecError::Invalid);
        }
        result.precision = precision;
        pos = next;
    }

    // [type]
    if let Some(&c) = chars.get(pos) {
        result.format_type = Some(FormatType::from_char(c).ok_or(FormatSpecError::Invalid)?);
        pos += 1;
    }

    if pos < chars.len() {
        return Err(FormatSpecError::Invalid);
    }

    Ok(result)
}

fn parse_number(chars: &[char], start: usize) -> Result<(Option<usize>, usize), FormatSpecError> {
    let mut pos = start;
    while chars.get(pos).is_some_and(char::is_ascii_digit) {
        pos += 1;
    }
    if pos == start {
        return Ok((None, pos));
    }
    let digits: String = chars[start..pos].iter().collect();
    let value = digits.parse().map_err(|_| FormatSpecError::TooLarge)?;
    Ok((Some(value), pos))
}

fn parse_align(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '^' => Some(Align::Center),
        '>' => Some(Align::Right),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}
