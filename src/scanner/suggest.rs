use std::collections::BTreeSet;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

/// Manifests are only looked for at the root and one level down.
const MANIFEST_DEPTH: usize = 2;
/// Source files may sit deeper (src/pages/index.tsx).
const SOURCE_DEPTH: usize = 5;

const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "vendor", ".venv", "venv", "target"];

/// Manifest file name -> tools it suggests.
const MANIFEST_RULES: &[(&[&str], &[&str])] = &[
    (&["requirements.txt", "Pipfile", "pyproject.toml", "setup.py"], &["bandit", "safety", "trivy"]),
    (&["package.json", "package-lock.json", "yarn.lock"], &["npm-audit", "njsscan", "trivy"]),
    (&["go.mod"], &["gosec", "trivy"]),
    (&["pom.xml", "build.gradle", "Gemfile", "Gemfile.lock", "Cargo.lock", "composer.json"], &["trivy"]),
];

const WEB_EXTENSIONS: &[&str] = &["html", "htm", "php", "jsx", "tsx", "vue", "svelte", "erb", "jsp", "aspx"];
const BINARY_EXTENSIONS: &[&str] = &["exe", "dll", "so", "jar", "war", "zip", "bin", "apk"];

/// Suggest tools for a checked-out repository from its file listing.
///
/// Returns an empty set when nothing matches (including an empty repository);
/// that means "no opinion", not failure.
pub fn suggest_tools(repo_path: &Path) -> BTreeSet<String> {
    let mut suggested = BTreeSet::new();
    let mut saw_file = false;

    let walker = WalkDir::new(repo_path)
        .max_depth(SOURCE_DEPTH)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        saw_file = true;

        let name = entry.file_name().to_string_lossy();

        if entry.depth() <= MANIFEST_DEPTH {
            for (manifests, tools) in MANIFEST_RULES {
                if manifests.contains(&name.as_ref()) {
                    suggested.extend(tools.iter().map(|t| t.to_string()));
                }
            }
        }

        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if WEB_EXTENSIONS.contains(&ext.as_str()) {
                suggested.insert("nikto".to_string());
            }
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                suggested.insert("clamav".to_string());
            }
        }
    }

    if saw_file {
        suggested.insert("semgrep".to_string());
    }

    suggested
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && SKIPPED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
}
