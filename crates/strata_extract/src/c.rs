//! Lexical extraction of named units from C sources and headers.

use crate::error::ExtractionError;
use crate::facts::FileFacts;
use strata_common::Interner;
use strata_source::SourceFile;

/// Extracts named units from a C translation unit.
///
/// The file defines its file-stem symbol (the name Fortran `DEPENDS ON:`
/// comments refer to). Quoted `#include` directives require the named
/// header; angle-bracket includes are system headers and external to the
/// build. `DEPENDS ON:` comments require further symbols.
pub(crate) fn extract_c(
    file: &SourceFile,
    interner: &Interner,
    facts: &mut FileFacts,
) -> Result<(), ExtractionError> {
    let stem = file_stem(file)?;
    facts.add_define(interner.intern_symbol(&stem));

    for (idx, raw) in file.content.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();

        if let Some(directive) = trimmed.strip_prefix('#') {
            let directive = directive.trim_start();
            if let Some(rest) = directive.strip_prefix("include") {
                let rest = rest.trim_start();
                if let Some(after_quote) = rest.strip_prefix('"') {
                    let name = after_quote.find('"').map(|end| &after_quote[..end]);
                    let name = name.ok_or_else(|| {
                        ExtractionError::new(
                            file.path.clone(),
                            line_no,
                            "unterminated include path",
                        )
                    })?;
                    facts.add_require(interner.get_or_intern(name));
                }
            }
            continue;
        }

        if let Some(name) = depends_on_in_comment(raw) {
            facts.add_require(interner.intern_symbol(&name));
        }
    }
    Ok(())
}

/// Extracts the define for a header or Fortran include file.
///
/// Such files define exactly one named unit, their own file name, matching
/// the exact spelling used in `#include "..."` and `include '...'`.
pub(crate) fn extract_header(
    file: &SourceFile,
    interner: &Interner,
    facts: &mut FileFacts,
) -> Result<(), ExtractionError> {
    let name = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ExtractionError::new(file.path.clone(), 1, "file has no usable name")
        })?;
    facts.add_define(interner.get_or_intern(&name));
    Ok(())
}

fn file_stem(file: &SourceFile) -> Result<String, ExtractionError> {
    file.path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| ExtractionError::new(file.path.clone(), 1, "file has no usable name"))
}

/// Finds a `DEPENDS ON:` annotation inside a `//` or `/* */` comment.
fn depends_on_in_comment(line: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();
    let pos = lower.find("depends on")?;
    // only honor the annotation when it sits inside a comment
    let before = &lower[..pos];
    if !before.contains("//") && !before.contains("/*") {
        return None;
    }
    crate::fortran::depends_on_name(&lower[pos..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strata_common::Ident;
    use strata_source::{FileId, SourceKind};

    fn extract(name: &str, kind: SourceKind, content: &str) -> (FileFacts, Interner) {
        let interner = Interner::new();
        let file = SourceFile::new(
            FileId::from_raw(0),
            PathBuf::from(name),
            kind,
            content.to_string(),
        );
        let mut facts = FileFacts::new(file.id, file.path.clone(), file.kind);
        match kind {
            SourceKind::C => extract_c(&file, &interner, &mut facts).unwrap(),
            _ => extract_header(&file, &interner, &mut facts).unwrap(),
        }
        (facts, interner)
    }

    fn names(idents: &[Ident], interner: &Interner) -> Vec<String> {
        idents.iter().map(|i| interner.resolve(*i).to_string()).collect()
    }

    #[test]
    fn c_file_defines_stem_and_requires_quoted_includes() {
        let (facts, interner) = extract(
            "util/exceptions.c",
            SourceKind::C,
            "#include <stdio.h>\n#include \"exceptions.h\"\nint trap(void) { return 0; }\n",
        );
        assert_eq!(names(&facts.defines, &interner), vec!["exceptions"]);
        assert_eq!(names(&facts.requires, &interner), vec!["exceptions.h"]);
    }

    #[test]
    fn system_includes_ignored() {
        let (facts, _) = extract("a.c", SourceKind::C, "#include <mpi.h>\n");
        assert!(facts.requires.is_empty());
    }

    #[test]
    fn depends_on_comment() {
        let (facts, interner) = extract(
            "a.c",
            SourceKind::C,
            "/* DEPENDS ON: timer_util */\n// depends on: io_layer.o\nint main(void) {}\n",
        );
        assert_eq!(
            names(&facts.requires, &interner),
            vec!["timer_util", "io_layer"]
        );
    }

    #[test]
    fn depends_on_outside_comment_ignored() {
        let (facts, _) = extract(
            "a.c",
            SourceKind::C,
            "int depends_on_nothing = 0; /* no annotation here */\n",
        );
        assert!(facts.requires.is_empty());
    }

    #[test]
    fn header_defines_own_name() {
        let (facts, interner) = extract(
            "include/Constants.h",
            SourceKind::CHeader,
            "#define PI 3.14\n",
        );
        assert_eq!(names(&facts.defines, &interner), vec!["Constants.h"]);
    }

    #[test]
    fn fortran_include_defines_own_name() {
        let (facts, interner) = extract(
            "shared/params.inc",
            SourceKind::FortranInclude,
            "integer, parameter :: nx = 96\n",
        );
        assert_eq!(names(&facts.defines, &interner), vec!["params.inc"]);
    }

    #[test]
    fn unterminated_include_errors() {
        let interner = Interner::new();
        let file = SourceFile::new(
            FileId::from_raw(0),
            PathBuf::from("bad.c"),
            SourceKind::C,
            "#include \"broken.h\nint x;\n".to_string(),
        );
        let mut facts = FileFacts::new(file.id, file.path.clone(), file.kind);
        let err = extract_c(&file, &interner, &mut facts).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
