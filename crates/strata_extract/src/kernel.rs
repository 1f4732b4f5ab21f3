//! Extraction for kernel-generation sources.
//!
//! These files are Fortran algorithm code with embedded `call invoke(...)`
//! statements that a code generator expands into an algorithm/kernel pair.
//! Beyond the plain Fortran pass, extraction records which `use ... only`
//! modules actually provide kernels referenced by an `invoke`, and defines
//! the synthetic `<stem>_psy` unit the generated pair compiles to.

use crate::error::ExtractionError;
use crate::facts::FileFacts;
use crate::fortran::{assemble_statements, extract_statements, parse_use};
use std::collections::BTreeMap;
use strata_common::Interner;
use strata_source::SourceFile;

pub(crate) fn extract_kernel(
    file: &SourceFile,
    interner: &Interner,
    facts: &mut FileFacts,
) -> Result<(), ExtractionError> {
    let (statements, comments) = assemble_statements(file)?;
    extract_statements(file, interner, facts, &statements, &comments)?;

    // kernel name -> providing module, from `use m, only: k` statements
    let mut candidates: BTreeMap<String, String> = BTreeMap::new();
    for stmt in &statements {
        let lower = stmt.text.to_ascii_lowercase();
        if let Ok(Some(use_stmt)) = parse_use(&lower) {
            for name in use_stmt.only {
                candidates.insert(name, use_stmt.module.clone());
            }
        }
    }

    for stmt in &statements {
        let squashed: String = stmt
            .text
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let Some(pos) = squashed.find("callinvoke(") else {
            continue;
        };
        let args = invoke_arguments(&squashed[pos + "callinvoke(".len() - 1..]).ok_or_else(
            || {
                ExtractionError::new(
                    file.path.clone(),
                    stmt.line,
                    "unbalanced parentheses in invoke call",
                )
            },
        )?;
        for arg in args {
            // an optional leading name="..." argument labels the invoke,
            // it does not reference a kernel
            if arg.starts_with("name=") {
                continue;
            }
            let kernel: String = arg
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if let Some(module) = candidates.get(&kernel) {
                facts.add_require(interner.intern_symbol(module));
            }
        }
    }

    let stem = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().to_ascii_lowercase())
        .ok_or_else(|| ExtractionError::new(file.path.clone(), 1, "file has no usable name"))?;
    facts.add_define(interner.intern_symbol(&format!("{stem}_psy")));
    Ok(())
}

/// Splits the parenthesized argument list starting at `(` into top-level
/// comma-separated arguments. Returns `None` when the parentheses are
/// unbalanced.
fn invoke_arguments(text: &str) -> Option<Vec<String>> {
    let mut depth = 0usize;
    let mut args = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(ch);
                }
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    if !current.is_empty() {
                        args.push(current);
                    }
                    return Some(args);
                }
                current.push(ch);
            }
            ',' if depth == 1 => {
                args.push(std::mem::take(&mut current));
            }
            _ => {
                if depth > 0 {
                    current.push(ch);
                }
            }
        }
    }
    None
}
