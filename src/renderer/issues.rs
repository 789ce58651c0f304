//! Issue table renderer.
//!
//! Sub-tasks are grouped under their parent: a dim parent row starts each
//! group, children follow with an indented summary, and a blank row separates
//! groups. In Select mode each child row carries its jump marker.

use super::selectable::SelectableListRenderer;
use super::{write_clipped, Renderer};
use crate::layout::{erase_block_area, BlockDimensions};
use crate::terminal::{display_width, Surface};
use crate::tracker::Issue;
use crate::types::Style;

const HEADING: &str = "Your Open Sub-Tasks:";
const COLUMN_GAP: usize = 2;
const CHILD_INDENT: &str = "    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueListData {
    pub issues: Vec<Issue>,
    pub loading: bool,
    pub show_markers: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IssueListRenderer;

struct Row<'a> {
    key: String,
    summary: String,
    status: &'a str,
    style: Style,
}

impl IssueListRenderer {
    fn rows(data: &IssueListData) -> Vec<Option<Row<'_>>> {
        let mut rows = Vec::new();
        let mut current_parent: Option<&str> = None;

        for (index, issue) in data.issues.iter().enumerate() {
            let parent = issue.fields.parent.as_ref();
            let parent_key = parent.map(|p| p.key.as_str());
            if parent_key != current_parent || index == 0 {
                if index > 0 {
                    rows.push(None);
                }
                if let Some(parent) = parent {
                    rows.push(Some(Row {
                        key: parent.key.clone(),
                        summary: parent.fields.summary.clone(),
                        status: parent
                            .fields
                            .status
                            .as_ref()
                            .map(|s| s.name.as_str())
                            .unwrap_or(""),
                        style: Style::new().dim(),
                    }));
                }
                current_parent = parent_key;
            }

            let key = if data.show_markers {
                let marker = SelectableListRenderer::marker_key(index);
                format!("[{marker}] {}", issue.key)
            } else {
                issue.key.clone()
            };
            let summary = if parent.is_some() {
                format!("{CHILD_INDENT}{}", issue.fields.summary)
            } else {
                issue.fields.summary.clone()
            };
            rows.push(Some(Row {
                key,
                summary,
                status: issue.status_name(),
                style: Style::new(),
            }));
        }
        rows
    }

    fn write_row(
        surface: &mut dyn Surface,
        dims: &BlockDimensions,
        y: u16,
        cells: [(&str, usize); 3],
        style: Style,
    ) {
        let mut x = dims.content_x as usize;
        let right = dims.content_x as usize + dims.content_width as usize;
        for (text, width) in cells {
            if x >= right {
                break;
            }
            let mut room = width.min(right - x);
            surface.move_to(x as u16, y);
            write_clipped(surface, text, style, &mut room);
            x += width + COLUMN_GAP;
        }
    }
}

impl Renderer for IssueListRenderer {
    type Data = IssueListData;

    fn render(&self, surface: &mut dyn Surface, data: &IssueListData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        erase_block_area(surface, dims);
        surface.move_to(dims.content_x, dims.content_y);
        let mut room = dims.content_width as usize;

        if data.loading {
            write_clipped(surface, "Loading issues ...", Style::new().bold().underline(), &mut room);
            return;
        }
        if data.issues.is_empty() {
            write_clipped(surface, "No issues found. Press \"r\" to reload.", Style::new(), &mut room);
            return;
        }

        write_clipped(surface, HEADING, Style::new().bold().underline(), &mut room);
        if dims.content_height < 3 {
            return;
        }

        let rows = Self::rows(data);
        let key_width = rows
            .iter()
            .flatten()
            .map(|row| display_width(&row.key))
            .fold(display_width("Key"), usize::max);
        let status_width = rows
            .iter()
            .flatten()
            .map(|row| display_width(row.status))
            .fold(display_width("Status"), usize::max);
        let summary_width = (dims.content_width as usize)
            .saturating_sub(key_width + status_width + 2 * COLUMN_GAP);

        let top = dims.content_y.saturating_add(2);
        Self::write_row(
            surface,
            dims,
            top,
            [("Key", key_width), ("Summary", summary_width), ("Status", status_width)],
            Style::new().bold(),
        );

        let capacity = dims.content_height.saturating_sub(3) as usize;
        for (offset, row) in rows.iter().take(capacity).enumerate() {
            if let Some(row) = row {
                Self::write_row(
                    surface,
                    dims,
                    top.saturating_add(1).saturating_add(offset as u16),
                    [
                        (row.key.as_str(), key_width),
                        (row.summary.as_str(), summary_width),
                        (row.status, status_width),
                    ],
                    row.style,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BlockConfig, LayoutBlock};
    use crate::terminal::MemorySurface;
    use crate::tracker::{sample_issue, IssueStatus, ParentFields, ParentIssue};
    use crate::types::Attr;

    fn dims(width: u16, height: u16) -> BlockDimensions {
        LayoutBlock::new(BlockConfig::new("content", 0, 0, width, height)).dimensions()
    }

    fn child_of(mut issue: Issue, key: &str, summary: &str) -> Issue {
        issue.fields.parent = Some(ParentIssue {
            key: key.to_string(),
            fields: ParentFields {
                summary: summary.to_string(),
                status: Some(IssueStatus { name: "Open".into() }),
            },
        });
        issue
    }

    #[test]
    fn test_loading_and_empty_states() {
        let mut surface = MemorySurface::new(50, 5);
        let mut data = IssueListData {
            loading: true,
            ..IssueListData::default()
        };
        IssueListRenderer.render(&mut surface, &data, &dims(50, 5));
        assert_eq!(surface.line(0), "Loading issues ...");
        assert!(surface.style_at(0, 0).unwrap().attrs.contains(Attr::UNDERLINE));

        data.loading = false;
        IssueListRenderer.render(&mut surface, &data, &dims(50, 5));
        assert_eq!(surface.line(0), "No issues found. Press \"r\" to reload.");
    }

    #[test]
    fn test_table_groups_children_under_parent() {
        let mut surface = MemorySurface::new(40, 10);
        let data = IssueListData {
            issues: vec![
                child_of(sample_issue("FLOW-2", "Wire bar", "Doing"), "FLOW-1", "Dashboard"),
                child_of(sample_issue("FLOW-3", "Tests", "To Do"), "FLOW-1", "Dashboard"),
                sample_issue("OPS-9", "Rotate keys", "To Do"),
            ],
            loading: false,
            show_markers: false,
        };
        IssueListRenderer.render(&mut surface, &data, &dims(40, 10));

        assert_eq!(surface.line(0), "Your Open Sub-Tasks:");
        assert_eq!(surface.line(1), "");
        // key 6, status 6, summary 40 - 6 - 6 - 4 = 24
        assert_eq!(surface.line(2), "Key     Summary                   Status");
        assert_eq!(surface.line(3), "FLOW-1  Dashboard                 Open");
        assert_eq!(surface.line(4), "FLOW-2      Wire bar              Doing");
        assert_eq!(surface.line(5), "FLOW-3      Tests                 To Do");
        assert_eq!(surface.line(6), "");
        assert_eq!(surface.line(7), "OPS-9   Rotate keys               To Do");
        assert!(surface.style_at(0, 3).unwrap().attrs.contains(Attr::DIM));
    }

    #[test]
    fn test_markers_and_row_capacity() {
        let mut surface = MemorySurface::new(40, 5);
        let data = IssueListData {
            issues: vec![
                sample_issue("A-1", "one", "x"),
                sample_issue("A-2", "two", "x"),
                sample_issue("A-3", "three", "x"),
            ],
            loading: false,
            show_markers: true,
        };
        IssueListRenderer.render(&mut surface, &data, &dims(40, 5));

        assert!(surface.line(3).starts_with("[a] A-1"));
        assert!(surface.line(4).starts_with("[s] A-2"));
    }
}
