//! File extension → language id, for hosts that only know a path.

use std::path::Path;

/// Best-effort language id for `path`, using the same ids editors report
/// (`cpp`, `csharp`, `typescriptreact`, ...). `None` for unknown extensions.
pub fn language_id_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let id = match extension.as_str() {
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "cs" => "csharp",
        "go" => "go",
        "java" => "java",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "shader" => "shaderlab",
        "rs" => "rust",
        "py" => "python",
        "lua" => "lua",
        "sql" => "sql",
        "php" => "php",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "txt" => "plaintext",
        _ => return None,
    };
    Some(id)
}
