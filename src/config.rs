//! Read-only configuration, consumed but never owned by the parser.
//!
//!     The real configuration subsystem (a giant option registry with an
//!     editable GUI/INI front-end) is out of scope; the parser only ever reads
//!     the handful of booleans/strings/lists enumerated in the external
//!     interfaces section. `Config::default()` matches DoxyPress's own
//!     defaults (autolink on, warn-if-doc-error on, warn-no-paramdoc off).

/// Boolean, string, and list settings the parser consults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub autolink_support: bool,
    pub warn_if_doc_error: bool,
    pub warn_no_paramdoc: bool,
    pub warn_no_paramdoc_return: bool,
    pub generate_html: bool,
    pub generate_latex: bool,
    pub generate_docbook: bool,
    pub generate_rtf: bool,
    pub use_pdflatex: bool,
    pub filter_source_files: bool,
    pub generate_todolist: bool,
    pub generate_testlist: bool,
    pub generate_buglist: bool,
    pub generate_deprecatedlist: bool,

    pub html_output: String,
    pub latex_output: String,
    pub docbook_output: String,
    pub rtf_output: String,
    pub plantuml_jar_path: String,

    pub example_path: Vec<String>,
    pub cite_bib_files: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autolink_support: true,
            warn_if_doc_error: true,
            warn_no_paramdoc: false,
            warn_no_paramdoc_return: false,
            generate_html: true,
            generate_latex: true,
            generate_docbook: false,
            generate_rtf: false,
            use_pdflatex: true,
            filter_source_files: false,
            generate_todolist: true,
            generate_testlist: true,
            generate_buglist: true,
            generate_deprecatedlist: true,

            html_output: "html".to_string(),
            latex_output: "latex".to_string(),
            docbook_output: "docbook".to_string(),
            rtf_output: "rtf".to_string(),
            plantuml_jar_path: String::new(),

            example_path: Vec::new(),
            cite_bib_files: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream() {
        let cfg = Config::default();
        assert!(cfg.autolink_support);
        assert!(cfg.warn_if_doc_error);
        assert!(!cfg.warn_no_paramdoc);
    }
}
