//! Copy/inherit preprocessor (C8) — the `\copydoc`/`\copybrief`/`\copydetails`
//! textual splice and `\inheritdoc`'s dispatcher-level handling.
//!
//!     The source does this as a second lexer pass that literally splices the
//!     target's raw comment text in before the real tokenizer ever sees it.
//!     That's preserved here: splicing happens on raw doc-comment strings,
//!     before any `Token`s exist, via `crate::xref::DocLookup` as the
//!     external collaborator that knows each symbol's brief/detailed text.

use crate::context::ParserContext;
use crate::diagnostics::DiagnosticSink;
use crate::xref::DocLookup;

/// One splice target extracted from a `\copydoc`-family command: which part
/// of the named symbol's doc comment to pull in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPart {
    Brief,
    Details,
    Both,
}

/// Parse the argument of `\copydoc foo::bar(int,const char *)` — the target
/// name plus any trailing parenthesized argument list used to disambiguate
/// overloads. Leading `const`/`volatile` qualifiers inside the parens are
/// kept verbatim (they are part of the overload signature, not noise to
/// strip), matching the source's balanced-paren scan.
pub fn extract_target(arg: &str) -> (String, Option<String>) {
    let arg = arg.trim();
    match arg.find('(') {
        None => (arg.to_string(), None),
        Some(open) => {
            let mut depth = 0usize;
            let mut close = None;
            for (i, c) in arg.char_indices().skip(open) {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            close = Some(i);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            match close {
                Some(close) => (arg[..open].trim().to_string(), Some(arg[open..=close].to_string())),
                // Unbalanced parens: treat the whole thing as the name rather
                // than silently dropping the trailing `(...` fragment.
                None => (arg.to_string(), None),
            }
        }
    }
}

/// Splice `command`'s target doc text into `ctx`'s copy stack and return the
/// text to reparse, or `None` if the target can't be resolved or a cycle is
/// detected (I5): a name already present on `ctx.copy_stack` means the splice
/// would recurse into itself.
///
/// Caller contract: on `Some`, the caller must push the returned key onto
/// `ctx.copy_stack` before reparsing the spliced text and pop it again on
/// every exit path (normal return, nested diagnostic, panic-free early
/// return) — see [`crate::context::ContextStack`] for the same discipline
/// applied to whole parser contexts.
pub fn resolve_copy<L>(
    ctx: &mut ParserContext,
    diagnostics: &mut DiagnosticSink,
    lookup: &L,
    part: CopyPart,
    raw_arg: &str,
    line: u32,
) -> Option<String>
where
    L: Fn(&str) -> Option<DocLookup>,
{
    let (target, _args) = extract_target(raw_arg);
    if ctx.copy_stack.iter().any(|k| k == &target) {
        diagnostics.error_doc(
            &ctx.file_name,
            line,
            format!("cyclic \\copydoc: `{target}` is already being expanded"),
        );
        return None;
    }
    let Some(doc) = lookup(&target) else {
        diagnostics.warn_doc_error(&ctx.file_name, line, format!("\\copydoc target `{target}` not found"));
        return None;
    };
    let text = match part {
        CopyPart::Brief => doc.brief,
        CopyPart::Details => doc.detailed,
        CopyPart::Both => {
            if doc.detailed.is_empty() {
                doc.brief
            } else if doc.brief.is_empty() {
                doc.detailed
            } else {
                format!("{}\n\n{}", doc.brief, doc.detailed)
            }
        }
    };
    Some(text)
}

/// Scoped acquire/release of one copy-stack entry, mirroring
/// `ContextStack::push_context`/`pop_context`'s discipline: constructing this
/// guard pushes `key`, dropping it pops — the cycle check in [`resolve_copy`]
/// only works if every splice is wrapped in one of these for its full
/// duration, including early returns from diagnostics raised mid-splice.
pub struct CopyGuard<'a> {
    stack: &'a mut Vec<String>,
}

impl<'a> CopyGuard<'a> {
    pub fn enter(ctx: &'a mut ParserContext, key: String) -> Self {
        ctx.copy_stack.push(key);
        Self { stack: &mut ctx.copy_stack }
    }
}

impl Drop for CopyGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_target_splits_name_and_args() {
        let (name, args) = extract_target("foo::bar(int, const char *)");
        assert_eq!(name, "foo::bar");
        assert_eq!(args.as_deref(), Some("(int, const char *)"));
    }

    #[test]
    fn extract_target_with_no_parens_is_bare_name() {
        let (name, args) = extract_target("  foo::bar  ");
        assert_eq!(name, "foo::bar");
        assert_eq!(args, None);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut ctx = ParserContext::new("a.h");
        ctx.copy_stack.push("foo::bar".to_string());
        let mut diag = DiagnosticSink::new();
        let result = resolve_copy(&mut ctx, &mut diag, &|_: &str| None, CopyPart::Both, "foo::bar", 1);
        assert!(result.is_none());
        assert!(diag.iter().any(|d| d.message.contains("cyclic")));
    }

    #[test]
    fn missing_target_warns_and_returns_none() {
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        let result = resolve_copy(&mut ctx, &mut diag, &|_: &str| None, CopyPart::Brief, "missing", 1);
        assert!(result.is_none());
        assert!(diag.iter().any(|d| d.message.contains("not found")));
    }

    #[test]
    fn resolves_brief_and_detailed_separately() {
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        let lookup = |name: &str| -> Option<DocLookup> {
            (name == "foo").then(|| DocLookup {
                brief: "Brief text.".to_string(),
                detailed: "Detailed text.".to_string(),
                def_id: None,
            })
        };
        let brief = resolve_copy(&mut ctx, &mut diag, &lookup, CopyPart::Brief, "foo", 1).unwrap();
        assert_eq!(brief, "Brief text.");
        let detailed = resolve_copy(&mut ctx, &mut diag, &lookup, CopyPart::Details, "foo", 1).unwrap();
        assert_eq!(detailed, "Detailed text.");
    }

    #[test]
    fn guard_pushes_and_pops_on_drop() {
        let mut ctx = ParserContext::new("a.h");
        {
            let _guard = CopyGuard::enter(&mut ctx, "foo".to_string());
        }
        assert!(ctx.copy_stack.is_empty());
    }
}
