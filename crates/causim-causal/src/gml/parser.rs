use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use causim_core::constants::{OUTCOME_NODE, TREATMENT_NODE};
use causim_core::errors::GmlError;

use super::unescape;
use crate::graph::{CausalGraph, CausalNode, DependencyEdge, NodeKind};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn syntax(&self, message: impl Into<String>) -> GmlError {
        GmlError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    /// Next token with the line it started on, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<(Token, usize)>, GmlError> {
        loop {
            match self.chars.peek().copied() {
                None => return Ok(None),
                Some('\n') => {
                    self.line += 1;
                    self.chars.next();
                }
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                // Comment to end of line.
                Some('#') => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.chars.next();
                    }
                }
                Some(_) => break,
            }
        }

        let line = self.line;
        let Some(c) = self.chars.next() else {
            return Ok(None);
        };
        let token = match c {
            '[' => Token::Open,
            ']' => Token::Close,
            '"' => {
                let mut s = String::new();
                loop {
                    match self.chars.next() {
                        None => return Err(self.syntax("unterminated string")),
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                self.line += 1;
                            }
                            s.push(ch);
                        }
                    }
                }
                Token::Str(unescape(&s))
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut key = String::from(c);
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        key.push(ch);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                Token::Key(key)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut num = String::from(c);
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+') {
                        num.push(ch);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                if let Ok(i) = num.parse::<i64>() {
                    Token::Int(i)
                } else if let Ok(f) = num.parse::<f64>() {
                    Token::Real(f)
                } else {
                    return Err(self.syntax(format!("invalid number {num:?}")));
                }
            }
            other => return Err(self.syntax(format!("unexpected character {other:?}"))),
        };
        Ok(Some((token, line)))
    }
}

/// Parse `key value` pairs until `]` (when `nested`) or end of input.
fn parse_list(lexer: &mut Lexer<'_>, nested: bool) -> Result<Vec<(String, Value)>, GmlError> {
    let mut items = Vec::new();
    loop {
        let key = match lexer.next_token()? {
            None if nested => return Err(lexer.syntax("missing closing ]")),
            None => return Ok(items),
            Some((Token::Close, _)) if nested => return Ok(items),
            Some((Token::Key(key), _)) => key,
            Some((other, line)) => {
                return Err(GmlError::Syntax {
                    line,
                    message: format!("expected a key, found {other:?}"),
                })
            }
        };
        let value = match lexer.next_token()? {
            None => return Err(lexer.syntax(format!("key {key} has no value"))),
            Some((Token::Int(i), _)) => Value::Int(i),
            Some((Token::Real(f), _)) => Value::Real(f),
            Some((Token::Str(s), _)) => Value::Str(s),
            Some((Token::Open, _)) => Value::List(parse_list(lexer, true)?),
            Some((other, line)) => {
                return Err(GmlError::Syntax {
                    line,
                    message: format!("unexpected {other:?} after key {key}"),
                })
            }
        };
        items.push((key, value));
    }
}

fn field<'v>(items: &'v [(String, Value)], name: &str) -> Option<&'v Value> {
    items.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn required_int(items: &[(String, Value)], element: &str, name: &str) -> Result<i64, GmlError> {
    match field(items, name) {
        Some(Value::Int(i)) => Ok(*i),
        Some(other) => Err(invalid(name, format!("expected an integer, found {other:?}"))),
        None => Err(GmlError::MissingField {
            element: element.to_string(),
            field: name.to_string(),
        }),
    }
}

fn optional_str<'v>(items: &'v [(String, Value)], name: &str) -> Result<Option<&'v str>, GmlError> {
    match field(items, name) {
        Some(Value::Str(s)) => Ok(Some(s)),
        Some(other) => Err(invalid(name, format!("expected a string, found {other:?}"))),
        None => Ok(None),
    }
}

fn invalid(field: &str, message: impl Into<String>) -> GmlError {
    GmlError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn parse_node(items: &[(String, Value)]) -> Result<(i64, CausalNode), GmlError> {
    let id = required_int(items, "node", "id")?;
    let name = optional_str(items, "label")?
        .ok_or_else(|| GmlError::MissingField {
            element: "node".to_string(),
            field: "label".to_string(),
        })?
        .to_string();

    let kind = match optional_str(items, "kind")? {
        Some(k) => NodeKind::from_str_name(k)
            .ok_or_else(|| invalid("kind", format!("unknown node kind {k:?}")))?,
        None if name == TREATMENT_NODE => NodeKind::Treatment,
        None if name == OUTCOME_NODE => NodeKind::Outcome,
        None => NodeKind::State,
    };

    let step = match field(items, "step") {
        Some(Value::Int(s)) => Some(
            usize::try_from(*s).map_err(|_| invalid("step", format!("negative step {s}")))?,
        ),
        Some(other) => return Err(invalid("step", format!("expected an integer, found {other:?}"))),
        None => None,
    };

    let observed = match field(items, "observed") {
        Some(Value::Str(s)) if s == "yes" => true,
        Some(Value::Str(s)) if s == "no" => false,
        Some(Value::Int(1)) => true,
        Some(Value::Int(0)) => false,
        Some(other) => return Err(invalid("observed", format!("expected \"yes\" or \"no\", found {other:?}"))),
        None => false,
    };

    Ok((
        id,
        CausalNode {
            name,
            kind,
            variable: optional_str(items, "variable")?.map(str::to_string),
            step,
            observed,
        },
    ))
}

/// Parse GML text into a [`CausalGraph`]. Edges go through the usual cycle
/// check, so a cyclic file is rejected.
pub fn from_gml(text: &str) -> Result<CausalGraph, GmlError> {
    let mut lexer = Lexer::new(text);
    let top = parse_list(&mut lexer, false)?;
    let body = match field(&top, "graph") {
        Some(Value::List(items)) => items,
        Some(_) => return Err(invalid("graph", "expected a list")),
        None => {
            return Err(GmlError::MissingField {
                element: "document".to_string(),
                field: "graph".to_string(),
            })
        }
    };
    if let Some(Value::Int(0)) = field(body, "directed") {
        return Err(invalid("directed", "causal graphs must be directed"));
    }

    let mut graph = CausalGraph::new();
    let mut names_by_id: HashMap<i64, String> = HashMap::new();
    for (key, value) in body {
        if key != "node" {
            continue;
        }
        let Value::List(items) = value else {
            return Err(invalid("node", "expected a list"));
        };
        let (id, node) = parse_node(items)?;
        if graph.get_node(&node.name).is_some() {
            return Err(invalid("label", format!("duplicate node {}", node.name)));
        }
        if names_by_id.insert(id, node.name.clone()).is_some() {
            return Err(invalid("id", format!("duplicate node id {id}")));
        }
        graph.ensure_node(node);
    }

    for (key, value) in body {
        if key != "edge" {
            continue;
        }
        let Value::List(items) = value else {
            return Err(invalid("edge", "expected a list"));
        };
        let endpoint = |name: &str| -> Result<String, GmlError> {
            let id = required_int(items, "edge", name)?;
            names_by_id
                .get(&id)
                .cloned()
                .ok_or_else(|| invalid(name, format!("no node with id {id}")))
        };
        let source = endpoint("source")?;
        let target = endpoint("target")?;
        let synthetic = matches!(field(items, "synthetic"), Some(Value::Int(i)) if *i != 0);
        graph
            .add_edge(&source, &target, DependencyEdge { synthetic })
            .map_err(|e| invalid("edge", e.to_string()))?;
    }

    Ok(graph)
}
