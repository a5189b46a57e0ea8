//! Per-lead portfolio document.

use std::path::{Path, PathBuf};

use chrono::Utc;

use leadforge_shared::{ClientProfile, Lead, LeadForgeError, Result};

/// Name the portfolio is stored under in the file store.
pub fn portfolio_name(lead_name: &str) -> String {
    format!("{lead_name}_Portfolio.md")
}

/// Render the portfolio Markdown for one lead.
pub fn render_portfolio(
    lead: &Lead,
    profile: &ClientProfile,
    services: &str,
    email: &str,
) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", lead.name));
    md.push_str(&format!("- **Website:** <{}>\n", lead.url));
    md.push_str(&format!("- **Industry:** {}\n", profile.industry));
    md.push_str(&format!(
        "- **Prepared:** {}\n\n",
        Utc::now().format("%Y-%m-%d")
    ));
    md.push_str("## About\n\n");
    md.push_str(profile.summary.trim());
    md.push_str("\n\n## What we offer\n\n");
    for service in services.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        md.push_str(&format!("- {service}\n"));
    }
    md.push_str("\n## Outreach draft\n\n");
    md.push_str(email.trim());
    md.push('\n');
    md
}

/// Write the rendered portfolio into `dir`. `position` is the lead's 1-based
/// place in the run and keeps local names unique. Returns the file path.
pub fn write_portfolio(
    dir: &Path,
    position: usize,
    lead_name: &str,
    content: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| LeadForgeError::io(dir, e))?;
    let path = dir.join(local_file_name(position, lead_name));
    std::fs::write(&path, content).map_err(|e| LeadForgeError::io(&path, e))?;
    Ok(path)
}

/// Filesystem-safe local name for a lead's portfolio.
fn local_file_name(position: usize, lead_name: &str) -> String {
    let slug: String = lead_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        format!("{position:03}-lead_Portfolio.md")
    } else {
        format!("{position:03}-{slug}_Portfolio.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_name_keeps_lead_name() {
        assert_eq!(portfolio_name("Foo Inc"), "Foo Inc_Portfolio.md");
    }

    #[test]
    fn local_names_are_slugs() {
        assert_eq!(
            local_file_name(1, "Foo Inc - Widgets"),
            "001-Foo-Inc-Widgets_Portfolio.md"
        );
        assert_eq!(local_file_name(12, "a/b"), "012-a-b_Portfolio.md");
        assert_eq!(local_file_name(3, "???"), "003-lead_Portfolio.md");
    }

    #[test]
    fn same_slug_leads_get_separate_files() {
        let dir = std::env::temp_dir().join(format!("lf_portfolio_{}", uuid::Uuid::now_v7()));
        let first = write_portfolio(&dir, 1, "Foo, Inc", "first").expect("write first");
        let second = write_portfolio(&dir, 2, "Foo Inc", "second").expect("write second");

        assert_ne!(first, second);
        assert_eq!(std::fs::read_to_string(first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "second");
    }

    #[test]
    fn renders_all_sections() {
        let lead = Lead::new("Foo Inc", "http://foo.com");
        let profile = ClientProfile {
            summary: "Foo sells widgets".into(),
            industry: "Manufacturing".into(),
        };
        let md = render_portfolio(&lead, &profile, "AI Audits, MLOps", "Hello Foo");

        assert!(md.starts_with("# Foo Inc\n"));
        assert!(md.contains("<http://foo.com>"));
        assert!(md.contains("**Industry:** Manufacturing"));
        assert!(md.contains("- AI Audits\n- MLOps\n"));
        assert!(md.contains("## Outreach draft\n\nHello Foo\n"));
    }

    #[test]
    fn writes_into_dir() {
        let dir = std::env::temp_dir().join(format!("lf_portfolio_{}", uuid::Uuid::now_v7()));
        let path = write_portfolio(&dir, 1, "Foo Inc", "# Foo Inc\n").expect("write");
        assert_eq!(path, dir.join("001-Foo-Inc_Portfolio.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Foo Inc\n");
    }
}
