//! Validation pass (C9) — post-parse cross-checks between `\param`/`\tparam`
//! documentation and the member's actual signature.
//!
//!     Runs once per `parse_doc` call after the tree is built, using the
//!     `params_found` bookkeeping `ParserContext` accumulated along the way
//!     (property P7). Python's `self` is exempt from "undocumented parameter"
//!     diagnostics regardless of whether it's listed in the signature;
//!     Fortran parameter names compare case-insensitively (both recovered
//!     from `docparser.cpp`'s `getLanguage()`-gated branches, since the
//!     distilled spec only says "language-dependent").

use crate::config::Config;
use crate::context::{Language, ParserContext};
use crate::diagnostics::DiagnosticSink;

/// The member signature a validation pass checks `\param` coverage against.
/// An external collaborator (the entity/symbol model) would normally own
/// this; this crate only needs the parameter name list and whether a return
/// value is expected.
#[derive(Debug, Clone, Default)]
pub struct MemberSignature {
    pub param_names: Vec<String>,
    pub has_return_value: bool,
}

fn names_equal(language: Language, a: &str, b: &str) -> bool {
    match language {
        Language::Fortran => a.eq_ignore_ascii_case(b),
        _ => a == b,
    }
}

fn is_exempt(language: Language, name: &str) -> bool {
    matches!(language, Language::Python) && name == "self"
}

/// Runs the full C9 check. Returns nothing: findings are diagnostics, same
/// as every other stage (§7's single-failure-channel design).
///
/// The `\param`-coverage checks only make sense once at least one `\param`
/// has been seen (nothing to cross-check against otherwise), so they stay
/// gated on `ctx.has_param_command`. The missing-`\return` check is
/// independent of that — a member can have a return value and no `\param`s
/// at all, and still owes a `\return` — so it runs unconditionally,
/// gated only by `config.warn_no_paramdoc_return`.
pub fn validate_params(ctx: &ParserContext, diagnostics: &mut DiagnosticSink, sig: &MemberSignature, config: &Config) {
    if ctx.has_param_command {
        if config.warn_no_paramdoc {
            let missing: Vec<&str> = sig
                .param_names
                .iter()
                .map(String::as_str)
                .filter(|name| !is_exempt(ctx.language, name))
                .filter(|name| !ctx.params_found.iter().any(|found| names_equal(ctx.language, found, name)))
                .collect();

            if !missing.is_empty() {
                diagnostics.warn_uncond(format!(
                    "{}: parameter(s) {} not documented",
                    ctx.owning_member.as_deref().unwrap_or(&ctx.file_name),
                    missing.join(", "),
                ));
            }
        }

        if config.warn_if_doc_error {
            let documented_unknown: Vec<&str> = ctx
                .params_found
                .iter()
                .map(String::as_str)
                .filter(|found| {
                    !sig.param_names
                        .iter()
                        .any(|name| names_equal(ctx.language, found, name))
                })
                .collect();
            for extra in documented_unknown {
                diagnostics.warn_doc_error(
                    &ctx.file_name,
                    0,
                    format!("\\param refers to `{extra}`, which is not a parameter of this member"),
                );
            }
        }
    }

    if sig.has_return_value && !ctx.has_return_command && config.warn_no_paramdoc_return {
        diagnostics.warn_doc_error(&ctx.file_name, 0, "member has a return value but no \\return documentation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_params(language: Language, found: &[&str]) -> ParserContext {
        let mut ctx = ParserContext::new("a.h");
        ctx.language = language;
        ctx.has_param_command = true;
        ctx.params_found = found.iter().map(|s| s.to_string()).collect();
        ctx
    }

    fn warn_everything() -> Config {
        Config { warn_no_paramdoc: true, warn_no_paramdoc_return: true, warn_if_doc_error: true, ..Config::default() }
    }

    #[test]
    fn missing_param_is_flagged() {
        let ctx = ctx_with_params(Language::Generic, &["x"]);
        let sig = MemberSignature { param_names: vec!["x".into(), "y".into()], has_return_value: false };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.iter().any(|d| d.message.contains("y") && d.message.contains("not documented")));
    }

    #[test]
    fn missing_param_check_is_gated_by_config() {
        let ctx = ctx_with_params(Language::Generic, &["x"]);
        let sig = MemberSignature { param_names: vec!["x".into(), "y".into()], has_return_value: false };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &Config::default());
        assert!(diag.is_empty());
    }

    #[test]
    fn python_self_is_exempt() {
        let ctx = ctx_with_params(Language::Python, &[]);
        let sig = MemberSignature { param_names: vec!["self".into()], has_return_value: false };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.is_empty());
    }

    #[test]
    fn fortran_names_compare_case_insensitively() {
        let ctx = ctx_with_params(Language::Fortran, &["COUNT"]);
        let sig = MemberSignature { param_names: vec!["count".into()], has_return_value: false };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.is_empty());
    }

    #[test]
    fn missing_return_is_flagged() {
        let mut ctx = ParserContext::new("a.h");
        ctx.has_param_command = true;
        let sig = MemberSignature { param_names: vec![], has_return_value: true };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.iter().any(|d| d.message.contains("\\return")));
    }

    /// The missing-`\return` check must not be gated on `has_param_command` —
    /// a member can owe a `\return` with no `\param` in sight.
    #[test]
    fn missing_return_is_flagged_even_without_any_param_command() {
        let ctx = ParserContext::new("a.h");
        let sig = MemberSignature { param_names: vec!["x".into()], has_return_value: true };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.iter().any(|d| d.message.contains("\\return")));
    }

    #[test]
    fn missing_return_check_is_gated_by_config() {
        let ctx = ParserContext::new("a.h");
        let sig = MemberSignature { param_names: vec![], has_return_value: true };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &Config::default());
        assert!(diag.is_empty());
    }

    #[test]
    fn no_param_command_skips_param_name_checks() {
        let ctx = ParserContext::new("a.h");
        let sig = MemberSignature { param_names: vec!["x".into()], has_return_value: false };
        let mut diag = DiagnosticSink::new();
        validate_params(&ctx, &mut diag, &sig, &warn_everything());
        assert!(diag.is_empty());
    }
}
