//! Non-interactive `dump` command: load once and print the grouped roster.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;
use tracing::{info, warn};

use retreat_roster_core::demo::FALLBACK_NOTICE;
use retreat_roster_core::models::{Attendee, Status};
use retreat_roster_core::roster::{
    display_group, render_html_group, sort_by_name, Escape, GroupDisplay, StatusGroups, YearFilter,
    EMPTY_GROUP_TEXT,
};
use retreat_roster_core::session::{LoadOutcome, RosterSession};
use retreat_roster_core::{Config, RosterClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DumpFormat {
    #[default]
    Text,
    Json,
    Html,
}

/// Load the roster (falling back to demo data) and print it to stdout
pub async fn run(endpoint: Option<String>, demo: bool, year: &str, format: DumpFormat) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let mut session = RosterSession::new(None);

    let client = if demo {
        None
    } else {
        let endpoint = match endpoint {
            Some(url) => Ok(url),
            None => config.endpoint(),
        };
        match endpoint.and_then(|url| RosterClient::new(&url, config.request_timeout())) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "No usable endpoint, using demo data");
                eprintln!("{}", FALLBACK_NOTICE);
                None
            }
        }
    };

    match client {
        Some(client) => {
            if let LoadOutcome::Fallback { notice } = session.load(&client).await {
                eprintln!("{}", notice);
            }
        }
        None => session.apply_demo(),
    }

    // A typed year is taken as-is; a tag nobody carries prints empty groups
    session.list_filter = YearFilter::from_token(year);
    info!(year = session.list_filter.token(), ?format, "Dumping roster");

    print!("{}", render(&session, format)?);
    Ok(())
}

fn render(session: &RosterSession, format: DumpFormat) -> Result<String> {
    let groups = session.groups();
    Ok(match format {
        DumpFormat::Text => render_text(&groups),
        DumpFormat::Json => render_json(&groups, &session.list_filter)?,
        DumpFormat::Html => render_html(&groups),
    })
}

fn render_text(groups: &StatusGroups<'_>) -> String {
    let mut out = String::new();
    for status in Status::ALL {
        let display = display_group(groups.group(status), Escape::Terminal);
        out.push_str(&format!("{} ({})\n", status.label(), display.len()));
        match display {
            GroupDisplay::Empty => out.push_str(&format!("  {}\n", EMPTY_GROUP_TEXT)),
            GroupDisplay::Entries(entries) => {
                for entry in entries {
                    out.push_str(&format!("  {:<24} {:<16} {}\n", entry.name, entry.years, entry.place));
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Sorted public view of a group. Emails stay private, as on the read API.
fn public_entries(group: &[&Attendee]) -> Vec<Attendee> {
    let mut group = group.to_vec();
    sort_by_name(&mut group);
    group
        .into_iter()
        .map(|a| Attendee {
            email: None,
            ..a.clone()
        })
        .collect()
}

fn render_json(groups: &StatusGroups<'_>, filter: &YearFilter) -> Result<String> {
    let value = json!({
        "year": filter.token(),
        "interested": public_entries(&groups.interested),
        "committed": public_entries(&groups.committed),
        "not_going": public_entries(&groups.not_going),
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
}

fn render_html(groups: &StatusGroups<'_>) -> String {
    Status::ALL
        .iter()
        .map(|status| render_html_group(status.label(), groups.group(*status)))
        .collect()
}
