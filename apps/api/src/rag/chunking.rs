use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Code,
    Readme,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Code => "code",
            ChunkKind::Readme => "readme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeChunk {
    /// `<path>::section::<i>` for README sections, `<path>::chunk::<i>` otherwise.
    pub chunk_id: String,
    pub content: String,
    pub file_path: String,
    pub kind: ChunkKind,
    pub language: Option<String>,
    pub metadata: serde_json::Value,
}

/// Splits a README at lines starting with `#`. Text before the first heading is
/// the "Introduction" section. Blank sections are dropped but keep their index.
pub fn chunk_readme(path: &str, content: &str) -> Vec<CodeChunk> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();
    let mut title = "Introduction".to_string();
    let mut lines: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if line.starts_with('#') {
            if !lines.is_empty() {
                sections.push((title, std::mem::take(&mut lines)));
            }
            title = line.trim_matches('#').trim().to_string();
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        sections.push((title, lines));
    }

    sections
        .into_iter()
        .enumerate()
        .filter_map(|(i, (title, lines))| {
            let text = lines.join("\n");
            let text = text.trim();
            (!text.is_empty()).then(|| CodeChunk {
                chunk_id: format!("{path}::section::{i}"),
                content: text.to_string(),
                file_path: path.to_string(),
                kind: ChunkKind::Readme,
                language: None,
                metadata: json!({ "section_title": title, "section_index": i }),
            })
        })
        .collect()
}

/// Groups consecutive lines until adding the next one would push the chunk
/// past `max_size` characters. A single oversize line still forms its own chunk.
pub fn chunk_by_size(content: &str, path: &str, max_size: usize) -> Vec<CodeChunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0;

    let make_chunk = |lines: &[&str], index: usize| CodeChunk {
        chunk_id: format!("{path}::chunk::{index}"),
        content: lines.join("\n"),
        file_path: path.to_string(),
        kind: ChunkKind::Code,
        language: None,
        metadata: json!({ "chunk_index": index }),
    };

    for line in content.split('\n') {
        let len = line.chars().count();
        if current_size + len > max_size && !current.is_empty() {
            chunks.push(make_chunk(&current, chunks.len()));
            current.clear();
            current_size = 0;
        }
        current.push(line);
        current_size += len;
    }
    if !current.is_empty() {
        chunks.push(make_chunk(&current, chunks.len()));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_sections_split_on_headings() {
        let readme = "Intro text\n# Setup\nrun it\n## Usage\nuse it\n";
        let chunks = chunk_readme("README.md", readme);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "Intro text");
        assert_eq!(chunks[0].metadata["section_title"], "Introduction");
        assert_eq!(chunks[1].chunk_id, "README.md::section::1");
        assert_eq!(chunks[1].metadata["section_title"], "Setup");
        assert_eq!(chunks[2].metadata["section_title"], "Usage");
        assert!(chunks.iter().all(|c| c.kind == ChunkKind::Readme));
    }

    #[test]
    fn test_readme_blank_sections_dropped() {
        let readme = "# Title\n\n   \n# Real\ncontent";
        let chunks = chunk_readme("README.md", readme);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "content");
        assert_eq!(chunks[0].chunk_id, "README.md::section::1");
    }

    #[test]
    fn test_readme_consecutive_headings_collapse() {
        let chunks = chunk_readme("r.md", "# A\n# B\nbody");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata["section_title"], "B");
    }

    #[test]
    fn test_chunk_by_size_respects_limit() {
        let line = "x".repeat(200);
        let content = [line.as_str(); 5].join("\n");
        let chunks = chunk_by_size(&content, "src/lib.rs", DEFAULT_MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.lines().count(), 2);
        assert_eq!(chunks[2].chunk_id, "src/lib.rs::chunk::2");
        assert_eq!(chunks[2].metadata["chunk_index"], 2);
    }

    #[test]
    fn test_chunk_by_size_keeps_oversize_line() {
        let content = "y".repeat(1200);
        let chunks = chunk_by_size(&content, "big.txt", 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.len(), 1200);
    }

    #[test]
    fn test_chunk_by_size_empty_content_yields_one_empty_chunk() {
        let chunks = chunk_by_size("", "empty.py", 500);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.is_empty());
    }
}
