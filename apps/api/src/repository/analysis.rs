//! Superficial project analysis: a directory walk, a language census by file
//! extension, and tech markers read off manifest files. No parsing of source.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

/// Shorter names ("C", "Go", "R") are substrings of unrelated skills.
const MIN_DETECTED_SKILL_CHARS: usize = 3;

const IGNORED_DIRS: &[&str] = &["node_modules", "__pycache__", "venv", "env", "target"];

pub const MAX_SAMPLE_FILES: usize = 10;
const MAX_SAMPLE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    /// Relative to the repository root, `/`-separated.
    pub path: String,
    pub language: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectAnalysis {
    pub total_files: usize,
    /// Language → number of source files.
    pub languages: BTreeMap<String, usize>,
    pub tech_markers: Vec<String>,
    pub readme: Option<String>,
    pub sample_files: Vec<SourceFile>,
}

impl ProjectAnalysis {
    /// Languages followed by tech markers, without duplicates or names too short to
    /// match meaningfully. Fed to skill matching.
    pub fn detected_skills(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.languages
            .keys()
            .chain(self.tech_markers.iter())
            .filter(|s| s.chars().count() >= MIN_DETECTED_SKILL_CHARS)
            .filter(|s| seen.insert(s.to_lowercase()))
            .cloned()
            .collect()
    }
}

fn language_for(extension: &str) -> Option<&'static str> {
    let language = match extension.to_ascii_lowercase().as_str() {
        "py" => "Python",
        "js" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "java" => "Java",
        "cpp" | "cc" | "hpp" => "C++",
        "c" | "h" => "C",
        "rs" => "Rust",
        "go" => "Go",
        "rb" => "Ruby",
        "cs" => "C#",
        "kt" => "Kotlin",
        "swift" => "Swift",
        "php" => "PHP",
        _ => return None,
    };
    Some(language)
}

/// Markers implied by the mere presence of a file.
fn marker_for_file(name: &str) -> Option<&'static str> {
    let marker = match name {
        "package.json" => "Node.js",
        "requirements.txt" | "pyproject.toml" | "setup.py" => "Python",
        "Cargo.toml" => "Rust",
        "go.mod" => "Go",
        "pom.xml" | "build.gradle" | "build.gradle.kts" => "Java",
        "Dockerfile" | "docker-compose.yml" | "docker-compose.yaml" => "Docker",
        "next.config.js" | "next.config.mjs" => "Next.js",
        "tailwind.config.js" | "tailwind.config.ts" => "Tailwind",
        "Jenkinsfile" | ".gitlab-ci.yml" => "CI/CD",
        _ if name.ends_with(".tf") => "Terraform",
        _ => return None,
    };
    Some(marker)
}

const NPM_MARKERS: &[(&str, &str)] = &[
    ("react", "React"),
    ("vue", "Vue"),
    ("next", "Next.js"),
    ("express", "Express"),
    ("redux", "State Management"),
    ("@reduxjs/toolkit", "State Management"),
    ("zustand", "State Management"),
    ("tailwindcss", "Tailwind"),
    ("jest", "Testing"),
    ("vitest", "Testing"),
    ("typescript", "TypeScript"),
];

const PYTHON_MARKERS: &[(&str, &str)] = &[
    ("fastapi", "FastAPI"),
    ("flask", "Flask"),
    ("django", "Django"),
    ("torch", "PyTorch"),
    ("tensorflow", "TensorFlow"),
    ("scikit-learn", "Python ML Libraries"),
    ("pandas", "Data Preprocessing"),
    ("numpy", "Data Preprocessing"),
    ("redis", "Caching (Redis)"),
    ("sqlalchemy", "Database Design"),
    ("pytest", "Testing"),
];

fn npm_markers(manifest: &str) -> Vec<&'static str> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(manifest) else {
        return Vec::new();
    };
    let mut deps = BTreeSet::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(map) = value.get(section).and_then(|v| v.as_object()) {
            deps.extend(map.keys().map(|k| k.to_lowercase()));
        }
    }
    NPM_MARKERS
        .iter()
        .filter(|(dep, _)| deps.contains(*dep))
        .map(|(_, marker)| *marker)
        .collect()
}

fn python_markers(requirements: &str) -> Vec<&'static str> {
    let names: BTreeSet<String> = requirements
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            l.split(|c: char| "=<>~![; ".contains(c))
                .next()
                .map(|n| n.to_lowercase())
        })
        .collect();
    PYTHON_MARKERS
        .iter()
        .filter(|(dep, _)| names.contains(*dep))
        .map(|(_, marker)| *marker)
        .collect()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn read_lossy(path: &Path, limit: usize) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let end = bytes.len().min(limit);
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

struct Walk {
    analysis: ProjectAnalysis,
    markers: BTreeSet<&'static str>,
}

impl Walk {
    fn visit(&mut self, root: &Path, dir: &Path) -> io::Result<()> {
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) && name != ".gitlab-ci.yml" {
                continue;
            }
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                if !IGNORED_DIRS.contains(&name.as_str()) {
                    self.visit(root, &path)?;
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            self.inspect_file(root, &path, &name)?;
        }
        Ok(())
    }

    fn inspect_file(&mut self, root: &Path, path: &Path, name: &str) -> io::Result<()> {
        if let Some(marker) = marker_for_file(name) {
            self.markers.insert(marker);
        }
        match name {
            "package.json" => self.markers.extend(npm_markers(&read_lossy(path, MAX_SAMPLE_BYTES)?)),
            "requirements.txt" => {
                self.markers.extend(python_markers(&read_lossy(path, MAX_SAMPLE_BYTES)?))
            }
            _ => {}
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if self.analysis.readme.is_none()
            && !relative.contains('/')
            && name.to_lowercase().starts_with("readme")
        {
            self.analysis.readme = Some(read_lossy(path, MAX_SAMPLE_BYTES)?);
        }

        let Some(language) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(language_for)
        else {
            return Ok(());
        };

        self.analysis.total_files += 1;
        *self
            .analysis
            .languages
            .entry(language.to_string())
            .or_insert(0) += 1;

        if self.analysis.sample_files.len() < MAX_SAMPLE_FILES {
            self.analysis.sample_files.push(SourceFile {
                path: relative,
                language,
                content: read_lossy(path, MAX_SAMPLE_BYTES)?,
            });
        }
        Ok(())
    }
}

/// Walks `root` and summarizes it. Blocking; run it on the blocking pool.
pub fn analyze_project(root: &Path) -> io::Result<ProjectAnalysis> {
    let mut walk = Walk {
        analysis: ProjectAnalysis::default(),
        markers: BTreeSet::new(),
    };
    walk.visit(root, root)?;

    if root.join(".github").join("workflows").is_dir() {
        walk.markers.insert("CI/CD");
    }

    let mut analysis = walk.analysis;
    analysis.tech_markers = walk.markers.into_iter().map(str::to_string).collect();
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_counts_languages_and_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main.py", "print('hi')");
        write(root, "src/util.py", "x = 1");
        write(root, "web/app.tsx", "export {}");
        write(root, "node_modules/lib/index.js", "module.exports = {}");
        write(root, "venv/lib/site.py", "");
        write(root, ".hidden/secret.py", "");
        write(root, "notes.txt", "plain text");

        let analysis = analyze_project(root).unwrap();
        assert_eq!(analysis.total_files, 3);
        assert_eq!(analysis.languages.get("Python"), Some(&2));
        assert_eq!(analysis.languages.get("TypeScript"), Some(&1));
        assert!(!analysis.languages.contains_key("JavaScript"));
        assert_eq!(analysis.sample_files[0].path, "src/main.py");
    }

    #[test]
    fn test_detects_markers_from_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "package.json",
            r#"{"dependencies": {"react": "^18"}, "devDependencies": {"jest": "^29"}}"#,
        );
        write(root, "api/requirements.txt", "fastapi==0.110\n# comment\nredis>=5\n");
        write(root, "Dockerfile", "FROM alpine");
        write(root, ".github/workflows/ci.yml", "on: push");

        let analysis = analyze_project(root).unwrap();
        for marker in ["Node.js", "React", "Testing", "Python", "FastAPI", "Caching (Redis)", "Docker", "CI/CD"] {
            assert!(
                analysis.tech_markers.iter().any(|m| m == marker),
                "missing marker {marker}: {:?}",
                analysis.tech_markers
            );
        }
    }

    #[test]
    fn test_readme_only_from_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/README.md", "# Nested");
        assert!(analyze_project(root).unwrap().readme.is_none());

        write(root, "README.md", "# Project\nDoes things.");
        let readme = analyze_project(root).unwrap().readme.unwrap();
        assert!(readme.starts_with("# Project"));
    }

    #[test]
    fn test_sample_files_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..(MAX_SAMPLE_FILES + 5) {
            write(dir.path(), &format!("f{i:02}.go"), "package main");
        }
        let analysis = analyze_project(dir.path()).unwrap();
        assert_eq!(analysis.total_files, MAX_SAMPLE_FILES + 5);
        assert_eq!(analysis.sample_files.len(), MAX_SAMPLE_FILES);
    }

    #[test]
    fn test_detected_skills_dedupes_case_insensitively() {
        let analysis = ProjectAnalysis {
            languages: BTreeMap::from([("Python".to_string(), 2)]),
            tech_markers: vec!["python".to_string(), "Docker".to_string()],
            ..Default::default()
        };
        assert_eq!(analysis.detected_skills(), vec!["Python", "Docker"]);
    }

    #[test]
    fn test_short_language_names_are_not_detected_skills() {
        let analysis = ProjectAnalysis {
            languages: BTreeMap::from([
                ("C".to_string(), 4),
                ("Go".to_string(), 1),
                ("Rust".to_string(), 2),
            ]),
            ..Default::default()
        };
        assert_eq!(analysis.detected_skills(), vec!["Rust"]);
    }

    #[test]
    fn test_pure_c_repository_has_no_frontend_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.c"), "int main(void) { return 0; }").unwrap();
        fs::write(dir.path().join("util.h"), "int util(void);").unwrap();

        let analysis = analyze_project(dir.path()).unwrap();
        assert_eq!(analysis.languages.get("C"), Some(&2));
        let detected = analysis.detected_skills();
        assert_eq!(crate::profiles::skill_match("Frontend", &detected).unwrap(), 0.0);
    }
}
