//! Node content parsing: YAML frontmatter plus structured markdown sections.

use std::sync::OnceLock;

use panday_types::roadmap::{MarkdownSections, NodeContent, NodeFrontmatter, ResourceLink};
use regex::Regex;

/// Split a node file into its YAML frontmatter and markdown body.
///
/// The file must open with a `---` line; the first later line starting with
/// `---` closes the block. One newline after the closing delimiter is dropped.
pub fn extract_frontmatter(content: &str) -> Result<(&str, &str), String> {
    let Some(after_open) = content.strip_prefix("---") else {
        return Err("missing YAML frontmatter delimiter '---'".to_string());
    };
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
        .unwrap_or(after_open);

    let (yaml, remainder) = if after_open.starts_with("---") {
        ("", &after_open[3..])
    } else {
        let closing = after_open
            .find("\n---")
            .ok_or_else(|| "missing closing frontmatter delimiter '---'".to_string())?;
        (&after_open[..closing], &after_open[closing + 4..])
    };

    let body = remainder
        .strip_prefix("\r\n")
        .or_else(|| remainder.strip_prefix('\n'))
        .unwrap_or(remainder);
    Ok((yaml, body))
}

/// Parse a whole node file.
pub fn parse_node_file(raw: &str) -> Result<NodeContent, String> {
    let (yaml, body) = extract_frontmatter(raw)?;
    let frontmatter: NodeFrontmatter =
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("invalid frontmatter: {e}"))?;
    let sections = parse_sections(body);

    Ok(NodeContent {
        frontmatter,
        content: body.to_string(),
        eligibility: sections.eligibility,
        benefits: sections.benefits,
        outcomes: sections.outcomes,
        resources: sections.resources,
    })
}

/// Extract the Eligibility, Benefits, Final Outcome and Resources sections.
///
/// Missing or empty sections are `None`.
pub fn parse_sections(body: &str) -> MarkdownSections {
    MarkdownSections {
        eligibility: section_body(body, Section::Eligibility).map(bullet_items),
        benefits: section_body(body, Section::Benefits).map(bullet_items),
        outcomes: section_body(body, Section::FinalOutcome).map(bullet_items),
        resources: section_body(body, Section::Resources).map(resource_links),
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Eligibility,
    Benefits,
    FinalOutcome,
    Resources,
}

impl Section {
    fn title(self) -> &'static str {
        match self {
            Section::Eligibility => "Eligibility",
            Section::Benefits => "Benefits",
            Section::FinalOutcome => "Final Outcome",
            Section::Resources => "Resources",
        }
    }

    /// Compiled once per section.
    fn heading(self) -> &'static Regex {
        static HEADINGS: [OnceLock<Regex>; 4] = [const { OnceLock::new() }; 4];
        HEADINGS[self as usize].get_or_init(|| {
            // Trailing whitespace may span blank lines; the body starts after
            // the last newline of that run.
            Regex::new(&format!(
                r"(?i)##\s+{}[ \t\r]*(?:\n[ \t\r]*)*\n",
                regex::escape(self.title())
            ))
            .expect("escaped section title is a valid pattern")
        })
    }
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link pattern"))
}

/// Text between a `## <title>` heading and the next `##` heading or `---`
/// line, or the end of the body.
fn section_body<'a>(body: &'a str, section: Section) -> Option<&'a str> {
    let heading = section.heading().find(body)?;
    let rest = &body[heading.end()..];
    let end = [rest.find("\n##"), rest.find("\n---")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    let section = &rest[..end];
    (!section.is_empty()).then_some(section)
}

fn bullet_items(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('*'))
        .map(|line| {
            let marker_stripped = &line[1..];
            match marker_stripped.strip_prefix(char::is_whitespace) {
                Some(rest) => rest.trim().to_string(),
                None => line.to_string(),
            }
        })
        .filter(|item| !item.is_empty() && !item.contains("TODO"))
        .collect()
}

fn resource_links(section: &str) -> Vec<ResourceLink> {
    section
        .lines()
        .filter(|line| line.contains("]("))
        .filter_map(|line| {
            let caps = link_regex().captures(line)?;
            Some(ResourceLink {
                label: caps.get(1)?.as_str().to_string(),
                href: caps.get(2)?.as_str().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panday_types::roadmap::NodeType;

    const NODE: &str = "---\nid: level-1\ntype: hub\ntitle: Level 1\nnodeType: hub\nbadge: L1\n---\n# Level 1\n\n## Eligibility\n\n- Completed foundation\n* 1500 work hours\n- TODO confirm hours\n\n## Benefits\n- Higher wage\n\n## Final Outcome\n- Level 1 certificate\n---\n## Resources\n- [SkilledTradesBC](https://skilledtradesbc.ca)\n- plain line\n- [Bad link](no-close\n";

    #[test]
    fn splits_frontmatter_and_body() {
        let (yaml, body) = extract_frontmatter("---\na: 1\n---\nbody\n").unwrap();
        assert_eq!(yaml, "a: 1");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn rejects_missing_frontmatter() {
        assert!(extract_frontmatter("# no frontmatter").is_err());
        assert!(extract_frontmatter("---\nid: x\n").is_err());
    }

    #[test]
    fn parses_full_node_file() {
        let node = parse_node_file(NODE).unwrap();
        assert_eq!(node.frontmatter.id, "level-1");
        assert_eq!(node.frontmatter.node_type, NodeType::Hub);
        assert_eq!(node.frontmatter.badge.as_deref(), Some("L1"));
        assert!(node.content.starts_with("# Level 1"));

        assert_eq!(
            node.eligibility.unwrap(),
            vec!["Completed foundation", "1500 work hours"]
        );
        assert_eq!(node.benefits.unwrap(), vec!["Higher wage"]);
        assert_eq!(node.outcomes.unwrap(), vec!["Level 1 certificate"]);
        assert_eq!(
            node.resources.unwrap(),
            vec![ResourceLink {
                label: "SkilledTradesBC".to_string(),
                href: "https://skilledtradesbc.ca".to_string(),
            }]
        );
    }

    #[test]
    fn headings_are_case_insensitive() {
        let sections = parse_sections("## ELIGIBILITY\n- a\n## benefits\n- b");
        assert_eq!(sections.eligibility.unwrap(), vec!["a"]);
        assert_eq!(sections.benefits.unwrap(), vec!["b"]);
    }

    #[test]
    fn missing_sections_are_none() {
        let sections = parse_sections("Just some text.\n");
        assert_eq!(sections, MarkdownSections::default());
    }

    #[test]
    fn section_ends_at_rule() {
        let sections = parse_sections("## Benefits\n- kept\n---\n- dropped\n");
        assert_eq!(sections.benefits.unwrap(), vec!["kept"]);
    }

    #[test]
    fn invalid_frontmatter_reports_cause() {
        let err = parse_node_file("---\nid: x\ntype: spaceship\n---\n").unwrap_err();
        assert!(err.starts_with("invalid frontmatter"));
    }

    #[test]
    fn heading_patterns_are_compiled_once() {
        assert!(std::ptr::eq(
            Section::FinalOutcome.heading(),
            Section::FinalOutcome.heading()
        ));
        assert!(!std::ptr::eq(
            Section::Benefits.heading(),
            Section::Resources.heading()
        ));
        let sections = parse_sections("## final outcome\n- Red Seal\n");
        assert_eq!(sections.outcomes.unwrap(), vec!["Red Seal"]);
    }
}
