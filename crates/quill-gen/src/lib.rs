//! Quill Gen - README generation
//!
//! Turns a scanned tree digest into a README by wrapping it in a
//! writing prompt and sending it to the Gemini `generateContent` API.
//!
//! # Example
//!
//! ```no_run
//! use quill_gen::{generate_readme, GeminiClient, Language};
//!
//! # async fn run(digest: String) -> quill_gen::Result<()> {
//! let client = GeminiClient::from_env()?;
//! let readme = generate_readme(&client, &digest, Language::English).await?;
//! println!("{}", readme);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gemini;
pub mod prompt;

pub use error::{GenerateError, Result};
pub use gemini::GeminiClient;
pub use prompt::{build_readme_prompt, Language};

/// Builds the README prompt for `digest` and asks the generation
/// service for the document. The response is trimmed of surrounding
/// whitespace.
pub async fn generate_readme(
    client: &GeminiClient,
    digest: &str,
    language: Language,
) -> Result<String> {
    let prompt = build_readme_prompt(digest, language);
    let markdown = client.generate(&prompt).await?;
    Ok(markdown.trim().to_string())
}
