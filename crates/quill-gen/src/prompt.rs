//! Prompt assembly and language selection.

use std::fmt;
use std::str::FromStr;

/// Output language for the generated README.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Arabic,
    French,
}

impl Language {
    /// Short code, as accepted on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
            Language::French => "fr",
        }
    }

    /// Human-readable name, for status output.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
            Language::French => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ar" | "arabic" => Ok(Language::Arabic),
            "fr" | "french" => Ok(Language::French),
            other => Err(format!(
                "unknown language '{other}' (expected en, ar, or fr)"
            )),
        }
    }
}

/// Wraps a tree digest in the README-writer prompt.
///
/// The base prompt is always English; non-English targets get an
/// instruction suffix telling the model to translate the prose while
/// leaving commands, URLs, and code blocks alone.
pub fn build_readme_prompt(digest: &str, language: Language) -> String {
    let mut prompt = format!(
        r#"You are a professional technical writer and README expert.

Your task is to generate a high-quality `README.md` file for a software project based on the following summarized file structure and content:

{digest}

---

Objective: the README must be clear, concise, and professional; written in Markdown using emojis, tables, and fenced code blocks where they improve readability; friendly to both developers and users; and GitHub-ready.

Core guidelines:
1. Do not invent information not seen in the provided structure or code.
2. If a section is relevant but cannot be filled from the files, write: "This section should be filled in by the project maintainer."
3. If no UI is found, skip screenshots or page descriptions.

Adapt to the project type: for backend-only projects focus on API documentation, setup, and environment configuration; for frontend-only projects emphasize pages and components; for full-stack projects combine both.

Sections to include, only where applicable:
- Overview: what the project does, who it is for, what problem it solves.
- Features: a bullet or checkmark list of key functionality.
- Project Structure: what each key file or folder does.
- API Endpoints: a Markdown table of method, endpoint, description, inputs, and response. Skip if no API is present.
- Tech Stack: languages, frameworks, libraries, and services in use.
- Getting Started: clone, install, and run instructions in fenced code blocks, plus environment variable setup and local URLs or ports.
- Environment Variables: a table of variable, description, and example if config files exist.
- Testing: how to run the tests and which framework is used, if tests exist.
- Deployment: build steps, hosting, and CI/CD if workflow files or a Dockerfile exist.
- Authentication & Security: login methods, protected routes, and roles if authentication is implemented.
- License: the correct license name and a one-line statement if a license file exists.

Formatting rules: use ### for section headings, prefer tables and bullet points for clarity, and use fenced code blocks (```bash or ```json) for command-line or config examples.
"#
    );

    match language {
        Language::English => {}
        Language::French => {
            prompt.push_str(
                "\nIMPORTANT: Generate the entire README in French (Français). \
                 Use proper French technical terminology, keep the same structure \
                 and formatting, keep code examples and technical elements (URLs, \
                 commands) in their original form, and translate all descriptive \
                 text, headings, and documentation to French.\n",
            );
        }
        Language::Arabic => {
            prompt.push_str(
                "\nIMPORTANT: Generate the entire README in Arabic (العربية). \
                 Use proper Arabic technical terminology, keep the same structure \
                 and formatting, keep code examples and technical elements (URLs, \
                 commands) in their original form, translate all descriptive text, \
                 headings, and documentation to Arabic, and use right-to-left text \
                 direction where appropriate while keeping Markdown formatting.\n",
            );
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Arabic);
        assert_eq!("french".parse::<Language>().unwrap(), Language::French);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_prompt_embeds_digest() {
        let prompt = build_readme_prompt("--- a.txt ---\nhello\n", Language::English);
        assert!(prompt.contains("--- a.txt ---\nhello"));
        assert!(prompt.contains("README"));
    }

    #[test]
    fn test_non_english_prompts_carry_translation_instructions() {
        let fr = build_readme_prompt("digest", Language::French);
        assert!(fr.contains("French"));

        let ar = build_readme_prompt("digest", Language::Arabic);
        assert!(ar.contains("Arabic"));

        let en = build_readme_prompt("digest", Language::English);
        assert!(!en.contains("IMPORTANT: Generate the entire README"));
    }
}
