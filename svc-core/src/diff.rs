use similar::{ChangeTag, TextDiff};

use crate::models::{Change, ChangeKind};

/// Line-level view of one change record, computed from stored blobs for
/// display. Nothing here is ever stored.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: String,
    pub kind: ChangeKind,
    pub old_content: Option<String>,
    pub new_content: Option<String>,
    pub binary: bool,
    pub diff_lines: Vec<DiffLine>,
}

#[derive(Debug, Clone)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
    pub old_line_number: Option<usize>,
    pub new_line_number: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Context,
    Addition,
    Deletion,
}

impl FileDiff {
    /// `old` is absent for additions and `new` is absent for deletions.
    pub fn from_change(change: &Change, old: Option<&[u8]>, new: Option<&[u8]>) -> Self {
        let old_text = old.map(|bytes| std::str::from_utf8(bytes).map(str::to_string));
        let new_text = new.map(|bytes| std::str::from_utf8(bytes).map(str::to_string));

        let binary = matches!(old_text, Some(Err(_))) || matches!(new_text, Some(Err(_)));
        let old_content = old_text.and_then(|t| t.ok());
        let new_content = new_text.and_then(|t| t.ok());

        let diff_lines = if binary {
            Vec::new()
        } else {
            Self::compute_diff(
                old_content.as_deref().unwrap_or(""),
                new_content.as_deref().unwrap_or(""),
            )
        };

        FileDiff {
            path: change.file_name.clone(),
            kind: change.kind,
            old_content,
            new_content,
            binary,
            diff_lines,
        }
    }

    fn compute_diff(old_text: &str, new_text: &str) -> Vec<DiffLine> {
        let diff = TextDiff::from_lines(old_text, new_text);
        let mut lines = Vec::new();
        let mut old_line_num = 1;
        let mut new_line_num = 1;

        for change in diff.iter_all_changes() {
            let (line_type, old_num, new_num) = match change.tag() {
                ChangeTag::Delete => {
                    let num = old_line_num;
                    old_line_num += 1;
                    (DiffLineType::Deletion, Some(num), None)
                }
                ChangeTag::Insert => {
                    let num = new_line_num;
                    new_line_num += 1;
                    (DiffLineType::Addition, None, Some(num))
                }
                ChangeTag::Equal => {
                    let old_num = old_line_num;
                    let new_num = new_line_num;
                    old_line_num += 1;
                    new_line_num += 1;
                    (DiffLineType::Context, Some(old_num), Some(new_num))
                }
            };

            lines.push(DiffLine {
                line_type,
                content: change.to_string(),
                old_line_number: old_num,
                new_line_number: new_num,
            });
        }

        lines
    }

    pub fn additions(&self) -> usize {
        self.count(DiffLineType::Addition)
    }

    pub fn deletions(&self) -> usize {
        self.count(DiffLineType::Deletion)
    }

    fn count(&self, line_type: DiffLineType) -> usize {
        self.diff_lines
            .iter()
            .filter(|l| l.line_type == line_type)
            .count()
    }

    /// Unified diff text with `context_lines` of context around each hunk.
    pub fn format_unified(&self, context_lines: usize) -> String {
        if self.binary {
            return format!("Binary file {} changed\n", self.path);
        }

        let old_text = self.old_content.as_deref().unwrap_or("");
        let new_text = self.new_content.as_deref().unwrap_or("");
        let old_header = if self.old_content.is_some() {
            format!("a/{}", self.path)
        } else {
            "/dev/null".to_string()
        };
        let new_header = if self.new_content.is_some() {
            format!("b/{}", self.path)
        } else {
            "/dev/null".to_string()
        };

        TextDiff::from_lines(old_text, new_text)
            .unified_diff()
            .context_radius(context_lines)
            .header(&old_header, &new_header)
            .to_string()
    }
}
