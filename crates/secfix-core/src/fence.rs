//! Markdown code-fence helpers shared by the prompt builders and the patch
//! extractor.

use std::path::Path;

/// Language tag for fencing the artifact in prompts, from its extension.
pub fn language_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "py" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cc" | "cpp" | "hpp" => "cpp",
        "sh" => "bash",
        _ => "",
    }
}

/// Interior of the first fenced block in `text`, if any.
///
/// When the opening line also closes the fence (`` ```x = 1``` ``), the text
/// between the fences is the interior. Otherwise the rest of the opening line
/// is the language tag and is dropped, and an unterminated block runs to the
/// end of the text. The interior is trimmed.
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let line_end = after_fence.find('\n').unwrap_or(after_fence.len());
    let opening_line = &after_fence[..line_end];
    if let Some(close) = opening_line.find("```") {
        return Some(opening_line[..close].trim());
    }

    let body = after_fence.get(line_end + 1..).unwrap_or("");
    let interior = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(interior.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension() {
        assert_eq!(language_for(Path::new("file_reader.py")), "python");
        assert_eq!(language_for(Path::new("src/lib.rs")), "rust");
        assert_eq!(language_for(Path::new("Makefile")), "");
    }

    #[test]
    fn extracts_tagged_block() {
        let text = "Here you go:\n```python\nimport os\nprint(1)\n```\nDone.";
        assert_eq!(extract_fenced_block(text), Some("import os\nprint(1)"));
    }

    #[test]
    fn extracts_untagged_block() {
        let text = "```\nx = 1\n```";
        assert_eq!(extract_fenced_block(text), Some("x = 1"));
    }

    #[test]
    fn first_block_wins() {
        let text = "```py\nfirst\n```\n```py\nsecond\n```";
        assert_eq!(extract_fenced_block(text), Some("first"));
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        assert_eq!(extract_fenced_block("```rust\nfn main() {}\n"), Some("fn main() {}"));
    }

    #[test]
    fn single_line_block() {
        assert_eq!(extract_fenced_block("```print(1)```"), Some("print(1)"));
        assert_eq!(
            extract_fenced_block("Fixed: ```x = safe(y)``` done\nmore"),
            Some("x = safe(y)")
        );
    }

    #[test]
    fn no_fence_is_none() {
        assert_eq!(extract_fenced_block("import os"), None);
    }
}
