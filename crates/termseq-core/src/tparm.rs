#![forbid(unsafe_code)]

//! Terminfo parameter-string expansion.
//!
//! Implements the stack language described in `terminfo(5)`:
//!
//! | Operator | Effect |
//! |----------|--------|
//! | `%%` | literal `%` |
//! | `%p1`..`%p9` | push parameter |
//! | `%d %o %x %X %s %c` | pop and print, with optional `[:flags][width[.precision]]` |
//! | `%Pa`/`%ga` | set/get dynamic (`a-z`) or static (`A-Z`) variable |
//! | `%'c'`, `%{nn}` | push character / integer constant |
//! | `%l` | push string length |
//! | `%+ %- %* %/ %m` | arithmetic |
//! | `%& %\| %^ %~` | bitwise |
//! | `%= %> %< %A %O %!` | comparison and logic |
//! | `%i` | increment the first two parameters |
//! | `%? c %t then %e else %;` | conditional, `%e` may chain |
//!
//! Padding markers (`$<5>`) are not interpreted and pass through verbatim.
//! Stack underflow yields `0` (or the empty string), matching ncurses.

use std::fmt;

/// A single parameter passed to (or living on the stack of) a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Number(i32),
    Text(String),
}

impl Default for Param {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Self::Number(n)
    }
}

impl From<u16> for Param {
    fn from(n: u16) -> Self {
        Self::Number(i32::from(n))
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A malformed template construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    message: String,
}

impl TemplateError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TemplateError {}

/// Variable storage for `%P`/`%g`.
///
/// Dynamic variables (`a-z`) and static variables (`A-Z`) live in separate
/// banks. Reuse one `Variables` across expansions to keep static values.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    dynamic: [Param; 26],
    fixed: [Param; 26],
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, name: char) -> Result<&mut Param, TemplateError> {
        match name {
            'a'..='z' => Ok(&mut self.dynamic[name as usize - 'a' as usize]),
            'A'..='Z' => Ok(&mut self.fixed[name as usize - 'A' as usize]),
            _ => Err(TemplateError::new(format!("invalid variable name {name:?}"))),
        }
    }
}

/// Expand `template` with `params` using a fresh variable bank.
pub fn expand(template: &str, params: &[Param]) -> Result<String, TemplateError> {
    expand_with(template, params, &mut Variables::default())
}

/// Expand `template` with `params`, reading and writing `vars`.
pub fn expand_with(
    template: &str,
    params: &[Param],
    vars: &mut Variables,
) -> Result<String, TemplateError> {
    if params.len() > 9 {
        return Err(TemplateError::new(format!(
            "at most 9 parameters are supported, received {}",
            params.len()
        )));
    }
    let mut mparams: [Param; 9] = Default::default();
    for (slot, param) in mparams.iter_mut().zip(params) {
        *slot = param.clone();
    }

    let src: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut stack: Vec<Param> = Vec::new();
    let mut i = 0;

    while i < src.len() {
        let c = src[i];
        i += 1;
        if c != '%' {
            out.push(c);
            continue;
        }
        let op = *src
            .get(i)
            .ok_or_else(|| TemplateError::new("template ends with a bare '%'"))?;
        i += 1;

        match op {
            '%' => out.push('%'),
            'c' => {
                let n = pop_number(&mut stack)?;
                out.push(char::from_u32(n as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            's' => {
                let p = stack.pop().unwrap_or_else(|| Param::Text(String::new()));
                out.push_str(&p.to_string());
            }
            'd' | 'o' | 'x' | 'X' => {
                let n = pop_number(&mut stack)?;
                out.push_str(&format_number(n, op, &Spec::default()));
            }
            ':' | '#' | ' ' | '.' | '0'..='9' => {
                let (spec, conv, next) = parse_spec(&src, i - 1)?;
                i = next;
                if conv == 's' {
                    let p = stack.pop().unwrap_or_else(|| Param::Text(String::new()));
                    out.push_str(&format_text(&p.to_string(), &spec));
                } else {
                    let n = pop_number(&mut stack)?;
                    out.push_str(&format_number(n, conv, &spec));
                }
            }
            'p' => {
                let index = src
                    .get(i)
                    .and_then(|c| c.to_digit(10))
                    .filter(|d| (1..=9).contains(d))
                    .ok_or_else(|| TemplateError::new("%p must be followed by 1-9"))?;
                i += 1;
                stack.push(mparams[index as usize - 1].clone());
            }
            'P' => {
                let name = *src
                    .get(i)
                    .ok_or_else(|| TemplateError::new("%P without variable name"))?;
                i += 1;
                let value = stack.pop().unwrap_or_default();
                *vars.slot_mut(name)? = value;
            }
            'g' => {
                let name = *src
                    .get(i)
                    .ok_or_else(|| TemplateError::new("%g without variable name"))?;
                i += 1;
                stack.push(vars.slot_mut(name)?.clone());
            }
            '\'' => match (src.get(i), src.get(i + 1)) {
                (Some(&ch), Some('\'')) => {
                    i += 2;
                    stack.push(Param::Number(ch as i32));
                }
                _ => return Err(TemplateError::new("unterminated character constant")),
            },
            '{' => {
                let start = i;
                while i < src.len() && src[i] != '}' {
                    i += 1;
                }
                if i == src.len() {
                    return Err(TemplateError::new("unterminated integer constant"));
                }
                let digits: String = src[start..i].iter().collect();
                let n = digits
                    .parse::<i32>()
                    .map_err(|_| TemplateError::new(format!("invalid integer constant {digits:?}")))?;
                i += 1;
                stack.push(Param::Number(n));
            }
            'l' => {
                let p = stack.pop().unwrap_or_else(|| Param::Text(String::new()));
                stack.push(Param::Number(p.to_string().chars().count() as i32));
            }
            '+' | '-' | '*' | '/' | 'm' | '&' | '|' | '^' | '=' | '>' | '<' | 'A' | 'O' => {
                let b = pop_number(&mut stack)?;
                let a = pop_number(&mut stack)?;
                stack.push(Param::Number(binary(op, a, b)));
            }
            '!' => {
                let a = pop_number(&mut stack)?;
                stack.push(Param::Number(i32::from(a == 0)));
            }
            '~' => {
                let a = pop_number(&mut stack)?;
                stack.push(Param::Number(!a));
            }
            'i' => {
                for slot in mparams.iter_mut().take(2) {
                    if let Param::Number(n) = slot {
                        *n = n.wrapping_add(1);
                    }
                }
            }
            '?' | ';' => {}
            't' => {
                if pop_number(&mut stack)? == 0 {
                    i = skip_branch(&src, i, true);
                }
            }
            'e' => i = skip_branch(&src, i, false),
            other => {
                return Err(TemplateError::new(format!("unsupported operator %{other}")));
            }
        }
    }
    Ok(out)
}

fn pop_number(stack: &mut Vec<Param>) -> Result<i32, TemplateError> {
    match stack.pop() {
        None => Ok(0),
        Some(Param::Number(n)) => Ok(n),
        Some(Param::Text(s)) => Err(TemplateError::new(format!(
            "expected a number on the stack, found {s:?}"
        ))),
    }
}

fn binary(op: char, a: i32, b: i32) -> i32 {
    match op {
        '+' => a.wrapping_add(b),
        '-' => a.wrapping_sub(b),
        '*' => a.wrapping_mul(b),
        '/' if b == 0 => 0,
        '/' => a.wrapping_div(b),
        'm' if b == 0 => 0,
        'm' => a.wrapping_rem(b),
        '&' => a & b,
        '|' => a | b,
        '^' => a ^ b,
        '=' => i32::from(a == b),
        '>' => i32::from(a > b),
        '<' => i32::from(a < b),
        'A' => i32::from(a != 0 && b != 0),
        'O' => i32::from(a != 0 || b != 0),
        _ => 0,
    }
}

/// Advance past the branch not taken.
///
/// With `stop_at_else`, stops after a same-level `%e` (the else branch
/// runs); otherwise only a same-level `%;` ends the skip.
fn skip_branch(src: &[char], mut i: usize, stop_at_else: bool) -> usize {
    let mut depth = 0usize;
    while i < src.len() {
        if src[i] != '%' {
            i += 1;
            continue;
        }
        let Some(&op) = src.get(i + 1) else {
            return src.len();
        };
        i += 2;
        match op {
            '?' => depth += 1,
            ';' if depth == 0 => return i,
            ';' => depth -= 1,
            'e' if depth == 0 && stop_at_else => return i,
            _ => {}
        }
    }
    src.len()
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    alternate: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
}

fn parse_spec(src: &[char], start: usize) -> Result<(Spec, char, usize), TemplateError> {
    let mut spec = Spec::default();
    let mut i = start;
    if src.get(i) == Some(&':') {
        i += 1;
    }
    loop {
        match src.get(i) {
            Some('-') => spec.left = true,
            Some('+') => spec.plus = true,
            Some('#') => spec.alternate = true,
            Some(' ') => spec.space = true,
            _ => break,
        }
        i += 1;
    }
    if src.get(i) == Some(&'0') {
        spec.zero = true;
        i += 1;
    }
    while let Some(d) = src.get(i).and_then(|c| c.to_digit(10)) {
        spec.width = spec.width * 10 + d as usize;
        i += 1;
    }
    if src.get(i) == Some(&'.') {
        i += 1;
        let mut precision = 0;
        while let Some(d) = src.get(i).and_then(|c| c.to_digit(10)) {
            precision = precision * 10 + d as usize;
            i += 1;
        }
        spec.precision = Some(precision);
    }
    match src.get(i) {
        Some(&conv @ ('d' | 'o' | 'x' | 'X' | 's')) => Ok((spec, conv, i + 1)),
        _ => Err(TemplateError::new("format specifier without conversion")),
    }
}

fn format_number(n: i32, conv: char, spec: &Spec) -> String {
    let mut digits = match conv {
        'o' => format!("{:o}", n as u32),
        'x' => format!("{:x}", n as u32),
        'X' => format!("{:X}", n as u32),
        _ => n.unsigned_abs().to_string(),
    };
    if let Some(precision) = spec.precision {
        while digits.len() < precision {
            digits.insert(0, '0');
        }
    }

    let mut prefix = String::new();
    if conv == 'd' {
        if n < 0 {
            prefix.push('-');
        } else if spec.plus {
            prefix.push('+');
        } else if spec.space {
            prefix.push(' ');
        }
    }
    if spec.alternate && n != 0 {
        match conv {
            'o' if !digits.starts_with('0') => prefix.push('0'),
            'x' => prefix.push_str("0x"),
            'X' => prefix.push_str("0X"),
            _ => {}
        }
    }

    let len = prefix.len() + digits.len();
    if len >= spec.width {
        return prefix + &digits;
    }
    let fill = spec.width - len;
    if spec.left {
        format!("{prefix}{digits}{}", " ".repeat(fill))
    } else if spec.zero && spec.precision.is_none() {
        format!("{prefix}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{prefix}{digits}", " ".repeat(fill))
    }
}

fn format_text(s: &str, spec: &Spec) -> String {
    let text: String = match spec.precision {
        Some(precision) => s.chars().take(precision).collect(),
        None => s.to_string(),
    };
    let len = text.chars().count();
    if len >= spec.width {
        return text;
    }
    let fill = " ".repeat(spec.width - len);
    if spec.left {
        text + &fill
    } else {
        fill + &text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETAF_256: &str = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";

    fn n(v: i32) -> Param {
        Param::Number(v)
    }

    #[test]
    fn cursor_address_increments() {
        let out = expand("\x1b[%i%p1%d;%p2%dH", &[n(1), n(2)]).unwrap();
        assert_eq!(out, "\x1b[2;3H");
    }

    #[test]
    fn setaf_chained_conditional() {
        assert_eq!(expand(SETAF_256, &[n(1)]).unwrap(), "\x1b[31m");
        assert_eq!(expand(SETAF_256, &[n(9)]).unwrap(), "\x1b[91m");
        assert_eq!(expand(SETAF_256, &[n(200)]).unwrap(), "\x1b[38;5;200m");
    }

    #[test]
    fn literal_percent_and_padding_marker() {
        assert_eq!(expand("100%%$<5>", &[]).unwrap(), "100%$<5>");
    }

    #[test]
    fn zero_padded_width() {
        assert_eq!(expand("%p1%02d", &[n(7)]).unwrap(), "07");
        assert_eq!(expand("%p1%3d|", &[n(7)]).unwrap(), "  7|");
        assert_eq!(expand("%p1%:-3d|", &[n(7)]).unwrap(), "7  |");
    }

    #[test]
    fn hex_octal_and_alternate() {
        assert_eq!(expand("%p1%x", &[n(255)]).unwrap(), "ff");
        assert_eq!(expand("%p1%X", &[n(255)]).unwrap(), "FF");
        assert_eq!(expand("%p1%o", &[n(8)]).unwrap(), "10");
        assert_eq!(expand("%p1%#x", &[n(255)]).unwrap(), "0xff");
    }

    #[test]
    fn arithmetic_and_constants() {
        assert_eq!(expand("%{10}%p1%+%d", &[n(5)]).unwrap(), "15");
        assert_eq!(expand("%p1%{3}%*%d", &[n(5)]).unwrap(), "15");
        assert_eq!(expand("%p1%{0}%/%d", &[n(5)]).unwrap(), "0");
        assert_eq!(expand("%p1%{3}%m%d", &[n(10)]).unwrap(), "1");
    }

    #[test]
    fn character_constant_and_output() {
        assert_eq!(expand("%'A'%c", &[]).unwrap(), "A");
        assert_eq!(expand("%p1%{32}%+%c", &[n(33)]).unwrap(), "A");
    }

    #[test]
    fn string_parameters() {
        let out = expand("\x1b]8;;%p1%s\x1b\\", &[Param::from("http://x")]).unwrap();
        assert_eq!(out, "\x1b]8;;http://x\x1b\\");
        assert_eq!(expand("%p1%l%d", &[Param::from("four")]).unwrap(), "4");
    }

    #[test]
    fn variables_roundtrip() {
        assert_eq!(expand("%p1%Pa%ga%ga%+%d", &[n(4)]).unwrap(), "8");
        let mut vars = Variables::new();
        expand_with("%p1%PZ", &[n(9)], &mut vars).unwrap();
        assert_eq!(expand_with("%gZ%d", &[], &mut vars).unwrap(), "9");
    }

    #[test]
    fn logic_operators() {
        assert_eq!(expand("%p1%!%d", &[n(0)]).unwrap(), "1");
        assert_eq!(expand("%p1%p2%A%d", &[n(1), n(0)]).unwrap(), "0");
        assert_eq!(expand("%p1%p2%O%d", &[n(1), n(0)]).unwrap(), "1");
        assert_eq!(expand("%p1%~%d", &[n(0)]).unwrap(), "-1");
    }

    #[test]
    fn nested_conditionals() {
        let tpl = "%?%p1%t%?%p2%tAB%eA%;%eN%;";
        assert_eq!(expand(tpl, &[n(1), n(1)]).unwrap(), "AB");
        assert_eq!(expand(tpl, &[n(1), n(0)]).unwrap(), "A");
        assert_eq!(expand(tpl, &[n(0), n(1)]).unwrap(), "N");
    }

    #[test]
    fn malformed_templates_rejected() {
        assert!(expand("%", &[]).is_err());
        assert!(expand("%p0", &[]).is_err());
        assert!(expand("%{12", &[]).is_err());
        assert!(expand("%z", &[]).is_err());
    }

    #[test]
    fn underflow_yields_zero() {
        assert_eq!(expand("%d", &[]).unwrap(), "0");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn templates_without_percent_are_verbatim(s in "[^%]{0,40}") {
                prop_assert_eq!(expand(&s, &[]).unwrap(), s);
            }

            #[test]
            fn decimal_matches_display(v in any::<i32>()) {
                prop_assert_eq!(expand("%p1%d", &[n(v)]).unwrap(), v.to_string());
            }
        }
    }
}
