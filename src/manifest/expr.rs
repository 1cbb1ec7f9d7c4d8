use crate::descriptor::ScalarKind;

use super::ManifestError;

/// Parsed field type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Scalar(ScalarKind),
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// A record, resolved against the manifest's records
    Named(String),
}

/// Parse a type expression such as `i32`, `[Item]`, `list<string>` or
/// `map<string, list<Item>>`.
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, ManifestError> {
    let expr = input.trim();
    let malformed = |reason: &str| ManifestError::MalformedType {
        expr: input.to_string(),
        reason: reason.to_string(),
    };

    if expr.is_empty() {
        return Err(malformed("empty type"));
    }

    if let Some(rest) = expr.strip_prefix('[') {
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| malformed("missing closing `]`"))?;
        return Ok(TypeExpr::List(Box::new(parse_type_expr(inner)?)));
    }

    if let Some((head, args)) = split_generic(expr).map_err(|reason| malformed(reason))? {
        let args = split_top_level(args).map_err(|reason| malformed(reason))?;
        return match (head, args.as_slice()) {
            ("list", [element]) => Ok(TypeExpr::List(Box::new(parse_type_expr(element)?))),
            ("map", [key, value]) => Ok(TypeExpr::Map(
                Box::new(parse_type_expr(key)?),
                Box::new(parse_type_expr(value)?),
            )),
            ("list", _) => Err(malformed("`list` takes one type argument")),
            ("map", _) => Err(malformed("`map` takes two type arguments")),
            _ => Err(malformed("only `list` and `map` take type arguments")),
        };
    }

    if !is_identifier(expr) {
        return Err(malformed("not a type name"));
    }
    Ok(scalar(expr).map_or_else(|| TypeExpr::Named(expr.to_string()), TypeExpr::Scalar))
}

fn scalar(name: &str) -> Option<ScalarKind> {
    let kind = match name {
        "i8" => ScalarKind::Int8,
        "i16" => ScalarKind::Int16,
        "i32" | "int32" => ScalarKind::Int32,
        "i64" | "int64" => ScalarKind::Int64,
        "u8" => ScalarKind::Uint8,
        "u16" => ScalarKind::Uint16,
        "u32" | "uint32" => ScalarKind::Uint32,
        "u64" | "uint64" => ScalarKind::Uint64,
        "f32" | "float" => ScalarKind::Float32,
        "f64" | "double" => ScalarKind::Float64,
        "bool" => ScalarKind::Bool,
        "string" | "String" => ScalarKind::Text,
        "timestamp" => ScalarKind::Timestamp,
        "duration" => ScalarKind::Duration,
        _ => return None,
    };
    Some(kind)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// `head<args>` → `Some((head, args))`; plain names → `None`.
fn split_generic(expr: &str) -> Result<Option<(&str, &str)>, &'static str> {
    let Some(open) = expr.find('<') else {
        return if expr.contains('>') {
            Err("unbalanced `>`")
        } else {
            Ok(None)
        };
    };
    let args = expr[open + 1..]
        .strip_suffix('>')
        .ok_or("type arguments must close the expression")?;
    Ok(Some((expr[..open].trim(), args)))
}

/// Split on commas that are not nested inside `<>` or `[]`.
fn split_top_level(args: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth = depth.checked_sub(1).ok_or("unbalanced brackets")?,
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced brackets");
    }
    parts.push(&args[start..]);
    Ok(parts)
}
