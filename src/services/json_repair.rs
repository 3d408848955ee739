//! Best-effort structural repair of almost-JSON text.
//!
//! The repair closes unbalanced strings, objects and arrays, inserts missing
//! commas and colons, drops trailing commas, escapes stray quotes and control
//! characters inside strings and quotes bare words. Several top-level values
//! are wrapped into one array. The output is not guaranteed to parse.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    Separator,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    closer: char,
    expect: Expect,
}

impl Frame {
    fn is_object(&self) -> bool {
        self.closer == '}'
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Key,
    Value,
}

#[derive(Debug, Default)]
struct Repairer {
    out: String,
    stack: Vec<Frame>,
    pending_comma: bool,
    top_level_values: usize,
}

pub fn repair_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut repairer = Repairer {
        out: String::with_capacity(input.len() + 16),
        ..Repairer::default()
    };

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i = match c {
            '"' => repairer.string(&chars, i),
            '{' | '[' => {
                repairer.open(c);
                i + 1
            }
            '}' | ']' => {
                repairer.close(c);
                i + 1
            }
            ',' => {
                repairer.comma();
                i + 1
            }
            ':' => {
                repairer.colon();
                i + 1
            }
            c if c.is_whitespace() => i + 1,
            _ => repairer.bare(&chars, i),
        };
    }

    repairer.into_output()
}

impl Repairer {
    /// Emits whatever separator the next token is missing and reports whether
    /// it sits in key or value position.
    fn begin(&mut self) -> Role {
        match self.stack.last_mut() {
            None => {
                if self.top_level_values > 0 {
                    self.out.push(',');
                }
                Role::Value
            }
            Some(frame) if frame.is_object() => match frame.expect {
                Expect::Key => {
                    if self.pending_comma {
                        self.out.push(',');
                        self.pending_comma = false;
                    }
                    Role::Key
                }
                Expect::Colon => {
                    self.out.push(':');
                    frame.expect = Expect::Value;
                    Role::Value
                }
                Expect::Value => Role::Value,
                Expect::Separator => {
                    self.out.push(',');
                    frame.expect = Expect::Key;
                    Role::Key
                }
            },
            Some(frame) => {
                if frame.expect == Expect::Separator || self.pending_comma {
                    self.out.push(',');
                }
                self.pending_comma = false;
                frame.expect = Expect::Value;
                Role::Value
            }
        }
    }

    fn finish(&mut self, role: Role) {
        match self.stack.last_mut() {
            None => self.top_level_values += 1,
            Some(frame) => {
                frame.expect = match role {
                    Role::Key => Expect::Colon,
                    Role::Value => Expect::Separator,
                }
            }
        }
    }

    fn open(&mut self, c: char) {
        // a container cannot be a key: the enclosing object was left unclosed
        if let Some(frame) = self.stack.last().copied() {
            if frame.is_object() && matches!(frame.expect, Expect::Key | Expect::Separator) {
                self.stack.pop();
                self.seal(frame);
            }
        }
        self.begin();
        self.out.push(c);
        let frame = if c == '{' {
            Frame {
                closer: '}',
                expect: Expect::Key,
            }
        } else {
            Frame {
                closer: ']',
                expect: Expect::Value,
            }
        };
        self.stack.push(frame);
    }

    fn close(&mut self, c: char) {
        if !self.stack.iter().any(|frame| frame.closer == c) {
            return;
        }
        while let Some(frame) = self.stack.pop() {
            self.seal(frame);
            if frame.closer == c {
                break;
            }
        }
    }

    fn seal(&mut self, frame: Frame) {
        if frame.is_object() {
            match frame.expect {
                Expect::Colon => self.out.push_str(":null"),
                Expect::Value => self.out.push_str("null"),
                Expect::Key | Expect::Separator => {}
            }
        }
        self.pending_comma = false;
        self.out.push(frame.closer);
        self.finish(Role::Value);
    }

    fn comma(&mut self) {
        match self.stack.last_mut() {
            Some(frame) if frame.expect == Expect::Separator => {
                frame.expect = if frame.is_object() {
                    Expect::Key
                } else {
                    Expect::Value
                };
                self.pending_comma = true;
            }
            Some(frame) if frame.is_object() && frame.expect == Expect::Value => {
                self.out.push_str("null");
                frame.expect = Expect::Key;
                self.pending_comma = true;
            }
            _ => {}
        }
    }

    fn colon(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.is_object() && frame.expect == Expect::Colon {
                self.out.push(':');
                frame.expect = Expect::Value;
            }
        }
    }

    /// Copies the string starting at `start`, returning the index after it.
    fn string(&mut self, chars: &[char], start: usize) -> usize {
        let role = self.begin();
        self.out.push('"');

        let mut i = start + 1;
        while i < chars.len() {
            match chars[i] {
                '\\' if valid_escape(chars, i) => {
                    let width = if chars[i + 1] == 'u' { 6 } else { 2 };
                    self.out.extend(&chars[i..i + width]);
                    i += width;
                    continue;
                }
                '"' if closes_string(chars, i + 1) => {
                    self.out.push('"');
                    self.finish(role);
                    return i + 1;
                }
                c => push_escaped(&mut self.out, c),
            }
            i += 1;
        }

        // unterminated at end of input
        self.out.push('"');
        self.finish(role);
        chars.len()
    }

    /// Reads a run of unquoted text as a literal, number or string.
    fn bare(&mut self, chars: &[char], start: usize) -> usize {
        let mut end = start;
        while end < chars.len()
            && !matches!(chars[end], ',' | ':' | '{' | '}' | '[' | ']' | '"' | '\n')
        {
            end += 1;
        }
        if end == start {
            return start + 1;
        }

        let token: String = chars[start..end].iter().collect();
        let token = token.trim();

        let role = self.begin();
        match (role, literal(token)) {
            (Role::Value, Some(literal)) => self.out.push_str(literal),
            _ => {
                self.out.push('"');
                token.chars().for_each(|c| push_escaped(&mut self.out, c));
                self.out.push('"');
            }
        }
        self.finish(role);
        end
    }

    fn into_output(mut self) -> String {
        while let Some(frame) = self.stack.pop() {
            self.seal(frame);
        }
        if self.top_level_values > 1 {
            format!("[{}]", self.out)
        } else {
            self.out
        }
    }
}

fn valid_escape(chars: &[char], i: usize) -> bool {
    match chars.get(i + 1) {
        Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => true,
        Some('u') => {
            chars.len() >= i + 6 && chars[i + 2..i + 6].iter().all(|c| c.is_ascii_hexdigit())
        }
        _ => false,
    }
}

/// A quote ends its string when what follows could not continue the string.
fn closes_string(chars: &[char], from: usize) -> bool {
    match chars[from..].iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ',' | ':' | '}' | ']' | '"' | '{' | '['),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

fn literal(token: &str) -> Option<&str> {
    match token {
        "true" | "True" => Some("true"),
        "false" | "False" => Some("false"),
        "null" | "None" | "undefined" => Some("null"),
        _ if serde_json::from_str::<serde_json::Number>(token).is_ok() => Some(token),
        _ => None,
    }
}
