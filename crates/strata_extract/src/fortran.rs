//! Lexical extraction of named units from free-form Fortran source.
//!
//! This is deliberately not a parser. Statements are reassembled across `&`
//! continuations with comments stripped, then classified by their leading
//! keywords. That is enough to find `module`/`program`/`subroutine`/
//! `function` definitions and `use`/`include` requirements without semantic
//! analysis.

use crate::error::ExtractionError;
use crate::facts::FileFacts;
use strata_common::Interner;
use strata_source::SourceFile;

/// Modules provided by the compiler runtime rather than the source tree.
const INTRINSIC_MODULES: &[&str] = &[
    "iso_c_binding",
    "iso_fortran_env",
    "ieee_arithmetic",
    "ieee_exceptions",
    "ieee_features",
    "omp_lib",
    "omp_lib_kinds",
];

/// One reassembled Fortran statement, or one comment fragment.
///
/// `line` is the 1-indexed physical line the statement (or comment) started
/// on, for error reporting.
#[derive(Debug)]
pub(crate) struct Statement {
    pub text: String,
    pub line: u32,
}

/// Splits a physical line at the first `!` outside character context.
///
/// Returns the code part and the comment text after the `!`, if any.
pub(crate) fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (i, ch) in line.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '!' => return (&line[..i], Some(&line[i + 1..])),
                _ => {}
            },
        }
    }
    (line, None)
}

/// Reassembles physical lines into logical statements, tracking `&`
/// continuation. Comment lines between continuation-marked lines are skipped
/// rather than terminating the statement. Preprocessor directives (`#`) are
/// ignored. Returns the statements and the stripped comments separately.
pub(crate) fn assemble_statements(
    file: &SourceFile,
) -> Result<(Vec<Statement>, Vec<Statement>), ExtractionError> {
    let mut statements = Vec::new();
    let mut comments = Vec::new();
    let mut pending: Option<Statement> = None;

    for (idx, raw) in file.content.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let (code, comment) = split_comment(raw);
        if let Some(text) = comment {
            comments.push(Statement {
                text: text.trim().to_string(),
                line: line_no,
            });
        }

        let mut code = code.trim();
        if code.is_empty() || code.starts_with('#') {
            continue;
        }
        if pending.is_some() {
            // a continuation line may repeat the marker at its start
            code = code.strip_prefix('&').unwrap_or(code).trim_start();
        }
        let (fragment, continues) = match code.strip_suffix('&') {
            Some(head) => (head.trim_end(), true),
            None => (code, false),
        };

        match pending.as_mut() {
            Some(stmt) => {
                stmt.text.push(' ');
                stmt.text.push_str(fragment);
            }
            None => {
                pending = Some(Statement {
                    text: fragment.to_string(),
                    line: line_no,
                });
            }
        }
        if !continues {
            if let Some(stmt) = pending.take() {
                statements.push(stmt);
            }
        }
    }

    if let Some(stmt) = pending {
        return Err(ExtractionError::new(
            file.path.clone(),
            stmt.line,
            "statement continuation is not terminated before end of file",
        ));
    }
    Ok((statements, comments))
}

/// A parsed `use` statement: the required module and any `only:` list.
pub(crate) struct UseStatement {
    pub module: String,
    pub only: Vec<String>,
}

/// Parses a lowercased statement as a `use` statement.
///
/// Returns `Ok(None)` when the statement is not a `use`, or when it names an
/// intrinsic module (those are satisfied by the compiler runtime, not the
/// source tree).
pub(crate) fn parse_use(stmt: &str) -> Result<Option<UseStatement>, String> {
    let rest = match stmt.strip_prefix("use") {
        Some(r) if r.starts_with(' ') || r.starts_with('\t') || r.starts_with(',') => r,
        _ => return Ok(None),
    };
    let mut rest = rest.trim_start();
    let mut intrinsic = false;
    if let Some(r) = rest.strip_prefix(',') {
        // module nature attribute: `use, intrinsic :: iso_c_binding`
        let (attr, after) = r
            .split_once("::")
            .ok_or_else(|| "malformed use statement".to_string())?;
        match attr.trim() {
            "intrinsic" => intrinsic = true,
            "non_intrinsic" => {}
            other => return Err(format!("unknown module nature '{other}'")),
        }
        rest = after.trim_start();
    } else if let Some((_, after)) = rest.split_once("::") {
        rest = after.trim_start();
    }

    let module: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if module.is_empty() {
        return Err("use statement with no module name".to_string());
    }
    if intrinsic || INTRINSIC_MODULES.contains(&module.as_str()) {
        return Ok(None);
    }

    let mut only = Vec::new();
    if let Some(pos) = rest.find(',') {
        let tail = rest[pos + 1..].trim_start();
        if let Some(list) = tail.strip_prefix("only") {
            if let Some(list) = list.trim_start().strip_prefix(':') {
                for item in list.split(',') {
                    // with rename syntax `local => actual`, the provided
                    // name is the right-hand side
                    let item = item.trim();
                    let name = match item.split_once("=>") {
                        Some((_, actual)) => actual.trim(),
                        None => item,
                    };
                    let name: String = name
                        .chars()
                        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                        .collect();
                    if !name.is_empty() {
                        only.push(name);
                    }
                }
            }
        }
    }
    Ok(Some(UseStatement { module, only }))
}

/// Extracts defines and requires from reassembled statements and comments.
///
/// Shared between plain Fortran files and kernel-generation files, which add
/// their own passes on top.
pub(crate) fn extract_statements(
    file: &SourceFile,
    interner: &Interner,
    facts: &mut FileFacts,
    statements: &[Statement],
    comments: &[Statement],
) -> Result<(), ExtractionError> {
    let mut interface_depth = 0usize;

    for stmt in statements {
        let lower = stmt.text.to_ascii_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            continue;
        };

        // interface blocks declare procedures defined elsewhere
        if first == "interface" || (first == "abstract" && tokens.get(1) == Some(&"interface")) {
            interface_depth += 1;
            continue;
        }
        if first == "endinterface" || (first == "end" && tokens.get(1) == Some(&"interface")) {
            interface_depth = interface_depth.saturating_sub(1);
            continue;
        }

        match parse_use(&lower) {
            Ok(Some(use_stmt)) => {
                facts.add_require(interner.intern_symbol(&use_stmt.module));
                continue;
            }
            Ok(None) if first == "use" || first.starts_with("use,") => continue,
            Ok(None) => {}
            Err(reason) => {
                return Err(ExtractionError::new(file.path.clone(), stmt.line, reason));
            }
        }

        if first == "include" {
            let name = quoted_name(&stmt.text).ok_or_else(|| {
                ExtractionError::new(
                    file.path.clone(),
                    stmt.line,
                    "include statement without a quoted file name",
                )
            })?;
            facts.add_require(interner.get_or_intern(name));
            continue;
        }

        if first == "module" || first == "program" {
            let Some(&name_token) = tokens.get(1) else {
                return Err(ExtractionError::new(
                    file.path.clone(),
                    stmt.line,
                    format!("{first} statement with no name"),
                ));
            };
            // `module procedure` implements an interface, it defines nothing
            // new; `module subroutine`/`module function` fall through to the
            // procedure scan below
            if first == "module"
                && matches!(name_token, "procedure" | "subroutine" | "function")
            {
                if name_token == "procedure" {
                    continue;
                }
            } else {
                let name = leading_identifier(name_token);
                if name.is_empty() {
                    return Err(ExtractionError::new(
                        file.path.clone(),
                        stmt.line,
                        format!("{first} statement with an invalid name"),
                    ));
                }
                facts.add_define(interner.intern_symbol(name));
                continue;
            }
        }

        if interface_depth == 0 && !first.starts_with("end") {
            if let Some(pos) = tokens
                .iter()
                .position(|t| *t == "subroutine" || *t == "function")
            {
                let Some(&name_token) = tokens.get(pos + 1) else {
                    return Err(ExtractionError::new(
                        file.path.clone(),
                        stmt.line,
                        format!("{} statement with no name", tokens[pos]),
                    ));
                };
                let name = leading_identifier(name_token);
                if name.is_empty() {
                    return Err(ExtractionError::new(
                        file.path.clone(),
                        stmt.line,
                        format!("{} statement with an invalid name", tokens[pos]),
                    ));
                }
                facts.add_define(interner.intern_symbol(name));
            }
        }
    }

    for comment in comments {
        if let Some(name) = depends_on_name(&comment.text) {
            facts.add_require(interner.intern_symbol(&name));
        }
    }
    Ok(())
}

/// Extracts named units from a free-form Fortran file.
pub(crate) fn extract_fortran(
    file: &SourceFile,
    interner: &Interner,
    facts: &mut FileFacts,
) -> Result<(), ExtractionError> {
    let (statements, comments) = assemble_statements(file)?;
    extract_statements(file, interner, facts, &statements, &comments)
}

/// Returns the name inside the first matched pair of quotes, if any.
fn quoted_name(text: &str) -> Option<&str> {
    let open = text.find(['\'', '"'])?;
    let quote = text[open..].chars().next()?;
    let rest = &text[open + 1..];
    let close = rest.find(quote)?;
    Some(&rest[..close])
}

/// Parses a `DEPENDS ON:` comment, returning the named symbol.
///
/// `name.o` forms name the object file; the require is on the symbol `name`.
pub(crate) fn depends_on_name(comment: &str) -> Option<String> {
    let lower = comment.trim().to_ascii_lowercase();
    let rest = lower.strip_prefix("depends")?;
    let rest = rest.trim_start().strip_prefix("on")?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let name = rest.trim();
    let name = name.strip_suffix(".o").unwrap_or(name);
    let name: String = name
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Returns the leading identifier characters of a token.
fn leading_identifier(token: &str) -> &str {
    let end = token
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(token.len());
    &token[..end]
}
