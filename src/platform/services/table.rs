//! Screen-scraping for the column-aligned tables printed by the `cf` CLI.
//!
//! `cf services` prints a header followed by rows whose columns keep the
//! header's alignment:
//!
//! ```text
//! name          service          plan   bound apps    last operation
//! my-analyzer   AdvancedMobile   free   app1, app2    create succeeded
//! ```
//!
//! Columns are located from the character offsets of the header labels, since
//! the CLI pads cells by character. Slices past the end of a short row are
//! clamped rather than rejected.

const HEADER_PREFIX: &str = "name";
const SERVICE_LABEL: &str = "service";
const PLAN_LABEL: &str = "plan";
const BOUND_APPS_LABEL: &str = "bound apps";
const LAST_OPERATION_LABEL: &str = "last operation";

/// One service instance row of `cf services`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRow {
    /// Instance name, trimmed.
    pub name: String,
    /// Raw bound-apps column, when the header carried one.
    pub bound_apps: Option<String>,
}

impl ServiceRow {
    /// First bound application, trimmed. An empty column yields `None`.
    #[must_use]
    pub fn first_bound_app(&self) -> Option<&str> {
        self.bound_apps
            .as_deref()
            .and_then(|apps| apps.split(',').next())
            .map(str::trim)
            .filter(|app| !app.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    service_start: usize,
    service_end: usize,
    bound: Option<(usize, usize)>,
}

impl Columns {
    fn from_header(header: &str) -> Option<Self> {
        let label_at = |label: &str| header.find(label).map(|byte| char_offset(header, byte));
        let service_start = label_at(SERVICE_LABEL).filter(|&offset| offset > 0)?;
        let service_end = label_at(PLAN_LABEL)
            .and_then(|offset| offset.checked_sub(1))
            .filter(|&offset| offset > 0)?;
        let bound = label_at(BOUND_APPS_LABEL)
            .zip(label_at(LAST_OPERATION_LABEL))
            .filter(|&(start, end)| start > 0 && end > 0);
        Some(Self {
            service_start,
            service_end,
            bound,
        })
    }
}

/// Number of characters before byte offset `byte` of `text`.
fn char_offset(text: &str, byte: usize) -> usize {
    text.get(..byte).map_or(0, |prefix| prefix.chars().count())
}

/// Characters `start..end` of `line`, clamped to its length.
fn column(line: &str, start: usize, end: usize) -> &str {
    let byte_at = |chars: usize| {
        line.char_indices()
            .nth(chars)
            .map_or(line.len(), |(offset, _)| offset)
    };
    let upper = byte_at(end);
    let lower = byte_at(start).min(upper);
    line.get(lower..upper).unwrap_or("")
}

/// Locate the row whose service column contains `service`.
///
/// Rows before the header are ignored. When several rows match, the last
/// one wins. Returns `None` when no header is found or no row matches.
#[must_use]
pub fn find_service_row(output: &str, service: &str) -> Option<ServiceRow> {
    let mut lines = output.lines();
    let header = lines.by_ref().find(|line| line.starts_with(HEADER_PREFIX))?;
    let columns = Columns::from_header(header)?;

    lines
        .rev()
        .find(|line| {
            line.contains(service)
                && column(line, columns.service_start, columns.service_end).contains(service)
        })
        .map(|line| ServiceRow {
            name: column(line, 0, columns.service_start).trim().to_owned(),
            bound_apps: columns
                .bound
                .map(|(start, end)| column(line, start, end).to_owned()),
        })
}

/// The first entry below the header of `cf service-keys`, trimmed.
///
/// The key table starts on the fourth line of output; anything shorter means
/// the instance has no keys.
#[must_use]
pub fn first_service_key(output: &str) -> Option<&str> {
    output
        .lines()
        .nth(3)
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Strip the banner and trailer lines around the JSON printed by
/// `cf service-key`.
#[must_use]
pub fn service_key_body(output: &str) -> String {
    let lines: Vec<&str> = output.split('\n').collect();
    lines
        .get(1..lines.len().saturating_sub(1))
        .map(|body| body.join("\n"))
        .unwrap_or_default()
}

/// Text after `Dashboard: ` in `cf service` output. The last such line wins.
#[must_use]
pub fn dashboard_url(output: &str) -> Option<&str> {
    output
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("Dashboard: "))
}

/// Collect the brace-delimited JSON blocks from `cf env` output.
///
/// A block opens on a line starting with `{` and closes on the next line
/// starting with `}`. Lines outside blocks are discarded; lines inside are
/// concatenated.
#[must_use]
pub fn json_blocks(output: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;
    for line in output.lines() {
        match current.as_mut() {
            Some(block) => {
                block.push_str(line);
                if line.starts_with('}') {
                    blocks.extend(current.take());
                }
            }
            None if line.starts_with('{') => current = Some(line.to_owned()),
            None => {}
        }
    }
    blocks
}
