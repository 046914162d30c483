//! LaTeX environment rewriting
//!
//! `equation` and `align` environments written outside dollar delimiters
//! are turned into block math:
//!
//! - `equation` content is escaped like any other math span and wrapped in
//!   `$$ ... $$`.
//! - `align` content keeps its `\\` row breaks and is re-wrapped in an
//!   explicit `\begin{align} ... \end{align}` inside `$$ ... $$`.
//!
//! Starred variants behave the same way.

use std::ops::Range;

use super::escape::escape_math_content;

const BEGIN_PREFIX: &str = r"\begin{";

/// Environments rewritten into block math
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Equation,
    EquationStar,
    Align,
    AlignStar,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Equation,
        Environment::EquationStar,
        Environment::Align,
        Environment::AlignStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Environment::Equation => "equation",
            Environment::EquationStar => "equation*",
            Environment::Align => "align",
            Environment::AlignStar => "align*",
        }
    }

    pub fn begin_tag(self) -> &'static str {
        match self {
            Environment::Equation => r"\begin{equation}",
            Environment::EquationStar => r"\begin{equation*}",
            Environment::Align => r"\begin{align}",
            Environment::AlignStar => r"\begin{align*}",
        }
    }

    pub fn end_tag(self) -> &'static str {
        match self {
            Environment::Equation => r"\end{equation}",
            Environment::EquationStar => r"\end{equation*}",
            Environment::Align => r"\end{align}",
            Environment::AlignStar => r"\end{align*}",
        }
    }

    pub fn is_align(self) -> bool {
        matches!(self, Environment::Align | Environment::AlignStar)
    }

    /// Rewrite an environment body into a block math span
    pub fn rewrite(self, body: &str) -> String {
        if self.is_align() {
            format!(
                "$$ {}{}{} $$",
                self.begin_tag(),
                escape_align_content(body),
                self.end_tag()
            )
        } else {
            format!("$$ {} $$", escape_math_content(body))
        }
    }
}

/// A complete environment found in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentMatch {
    pub environment: Environment,
    /// Byte range of the body between the tags
    pub body: Range<usize>,
    /// Byte offset just past the end tag
    pub end: usize,
}

/// Match a complete environment whose begin tag starts at `at`
pub fn find_environment(text: &str, at: usize) -> Option<EnvironmentMatch> {
    let rest = text.get(at..)?;
    let environment = Environment::ALL
        .into_iter()
        .find(|env| rest.starts_with(env.begin_tag()))?;

    let body_start = at + environment.begin_tag().len();
    let body_len = text[body_start..].find(environment.end_tag())?;
    let body_end = body_start + body_len;

    Some(EnvironmentMatch {
        environment,
        body: body_start..body_end,
        end: body_end + environment.end_tag().len(),
    })
}

/// Rewrite every complete `equation` / `align` environment in `text`
///
/// An unterminated environment is left as literal text.
pub fn rewrite_environments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(BEGIN_PREFIX) {
        let at = cursor + rel;
        match find_environment(text, at) {
            Some(found) => {
                result.push_str(&text[copied..at]);
                result.push_str(&found.environment.rewrite(&text[found.body]));
                cursor = found.end;
                copied = cursor;
            }
            None => cursor = at + BEGIN_PREFIX.len(),
        }
    }

    result.push_str(&text[copied..]);
    result
}

/// Escape align content for one Markdown pass
///
/// Row breaks (`\\`) become `\\\\`, every other backslash is doubled, and
/// `_`, `{`, `}` get a backslash prefix. Row breaks are paired left to
/// right, so `\\\` is a row break followed by a lone command backslash.
pub fn escape_align_content(content: &str) -> String {
    let mut result = String::with_capacity(content.len() * 2);
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'\\') => {
                chars.next();
                result.push_str(r"\\\\");
            }
            '\\' => result.push_str(r"\\"),
            '_' => result.push_str(r"\_"),
            '{' => result.push_str(r"\{"),
            '}' => result.push_str(r"\}"),
            c => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equation() {
        assert_eq!(
            rewrite_environments(r"\begin{equation}E=mc^2\end{equation}"),
            "$$ E=mc^2 $$"
        );
    }

    #[test]
    fn test_equation_escapes_content() {
        assert_eq!(
            rewrite_environments(r"\begin{equation}\frac{a}{b_1}\end{equation}"),
            r"$$ \\frac\{a\}\{b\_1\} $$"
        );
    }

    #[test]
    fn test_align_rows() {
        let result = rewrite_environments(r"\begin{align} a &= b \\ c &= d \end{align}");
        assert_eq!(
            result,
            r"$$ \begin{align} a &= b \\\\ c &= d \end{align} $$"
        );
    }

    #[test]
    fn test_align_commands_and_subscripts() {
        let result =
            rewrite_environments(r"\begin{align}x_1 &= \alpha \\ y_{2} &= \beta\end{align}");
        assert_eq!(
            result,
            r"$$ \begin{align}x\_1 &= \\alpha \\\\ y\_\{2\} &= \\beta\end{align} $$"
        );
    }

    #[test]
    fn test_starred_variants() {
        assert_eq!(
            rewrite_environments(r"\begin{equation*}x\end{equation*}"),
            "$$ x $$"
        );
        assert_eq!(
            rewrite_environments(r"\begin{align*}a\\b\end{align*}"),
            r"$$ \begin{align*}a\\\\b\end{align*} $$"
        );
    }

    #[test]
    fn test_multiple_and_multiline() {
        let input = "A\n\\begin{equation}\nx\n\\end{equation}\nB \\begin{align}y\\end{align}";
        assert_eq!(
            rewrite_environments(input),
            "A\n$$ \nx\n $$\nB $$ \\begin{align}y\\end{align} $$"
        );
    }

    #[test]
    fn test_unterminated_left_alone() {
        let input = r"\begin{equation} x \begin{align}y\end{align}";
        assert_eq!(
            rewrite_environments(input),
            r"\begin{equation} x $$ \begin{align}y\end{align} $$"
        );
    }

    #[test]
    fn test_other_environments_untouched() {
        let input = r"\begin{pmatrix}a\end{pmatrix}";
        assert_eq!(rewrite_environments(input), input);
    }

    #[test]
    fn test_find_environment_ranges() {
        let text = r"x \begin{align}ab\end{align} y";
        let found = find_environment(text, 2).unwrap();
        assert_eq!(found.environment, Environment::Align);
        assert_eq!(&text[found.body.clone()], "ab");
        assert_eq!(&text[found.end..], " y");
        assert!(find_environment(text, 0).is_none());
    }

    #[test]
    fn test_align_escape_matches_generic_escape() {
        for content in [r"a \\ b", r"\\\x", r"\frac{a}{b}_c \\ d", r"\\\\"] {
            assert_eq!(escape_align_content(content), escape_math_content(content));
        }
    }
}
