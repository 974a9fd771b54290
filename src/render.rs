//! Page composition for downloaded map artifacts.
//!
//! The artifact is an opaque, self-contained HTML document. It is embedded
//! in a fixed-height, scrollable frame of a standalone page, followed by the
//! color legend when the 1997 exposure score is shown.

use crate::error::RenderError;
use crate::models::{ExposureMetric, Geography, Selection};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const TITLE: &str = "Hip Hop Exposure Map";

pub const INTRODUCTION: &str = "\
The map below shows the amount of Hip Hop played over radio across geographies in the US.

Data was compiled from:
1. an archived FCC dataset of engineering information about antennas registered in 1997
2. Broadcasting & Cable yearbooks, a discontinued publication that provided information about radio stations (digitized from paper copies stored in the Harvard Business School Library)

There are three geographies available to view:
1. Radio Station Broadcast Range: This map shows the broadcast range of every radio station and the concentration of Hip Hop played
2. County: This map shows a Hip Hop exposure score for every county
3. Census Tract: This map shows the same for every census tract

There are two types of data available:
1. 1997 Hip Hop Exposure: A score of the concentration of Hip Hop played over radio in 1997 in a given geography
2. Year of Initial Exposure: The year that the tract or station was first exposed to Hip Hop";

const METHOD_TRACT: &str = "\
1. Calculating a Hip Hop concentration for every radio station:
   - The genres of music played by each station are identified
   - The Hip Hop concentration of a station is defined as the fraction of Hip Hop genres to all genres
2. Calculating a Hip Hop exposure score for every census tract:
   - The population centroid of each tract is identified
   - The broadcast range of every radio station is identified
   - The stations whose broadcast range reaches the tract's population centroid are compiled
   - The tract's Hip Hop exposure score is calculated as either the sum or average of the Hip Hop concentration of all stations
   - The score can be weighted by each station's rating (a measure of how many listeners a station has)
   - Scores are normalized to a scale of 0 to 1";

const METHOD_COUNTY: &str = "
3. Calculating a county's exposure score:
   - The county's exposure score is calculated as the sum or average of all stations that reach a tract in the county";

pub const RATING_NOTE: &str =
    "Note: Rating data is only available for half of the census tracts and a minority of counties";

/// How the exposure score is calculated, for geographies that have one.
pub fn methodology(geography: Geography) -> Option<String> {
    match geography {
        Geography::CensusTract => Some(METHOD_TRACT.to_string()),
        Geography::County => Some(format!("{METHOD_TRACT}{METHOD_COUNTY}")),
        Geography::StationRange => None,
    }
}

/// One row of the color key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendTier {
    pub label: &'static str,
    /// Red channel is always full; only opacity varies.
    pub alpha: f32,
    pub outlined: bool,
}

/// Color encoding used inside the 1997 exposure artifacts, strongest first.
pub const LEGEND_TIERS: [LegendTier; 3] = [
    LegendTier {
        label: "High Hip Hop Exposure (Reddish)",
        alpha: 1.0,
        outlined: false,
    },
    LegendTier {
        label: "Moderate Hip Hop Exposure (Transparent Reddish)",
        alpha: 0.5,
        outlined: false,
    },
    LegendTier {
        label: "No Hip Hop Exposure (Transparent)",
        alpha: 0.0,
        outlined: true,
    },
];

/// Static legend block for the 1997 exposure score.
pub fn legend_html() -> String {
    let mut out = String::from(
        "<div class=\"legend\" style=\"width: 100%; background-color: white; border: 2px solid black; \
         padding: 10px; font-size: 14px; line-height: 1.5; text-align: left; margin-bottom: 5mm;\">\n\
         <b>Legend</b><br>\n<b>1997 Hip Hop Exposure:</b><br>\n",
    );
    for tier in LEGEND_TIERS {
        let border = if tier.outlined { " border: 1px solid black;" } else { "" };
        let _ = writeln!(
            out,
            "<i style=\"background: rgba(255, 0, 0, {});{border} width: 20px; height: 10px; display: inline-block;\"></i> {}<br>",
            tier.alpha, tier.label
        );
    }
    out.push_str("</div>\n");
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Height of the map frame in pixels.
    pub frame_height: u32,
    /// Include the title, introduction and methodology text.
    pub include_intro: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            frame_height: crate::config::DEFAULT_FRAME_HEIGHT,
            include_intro: true,
        }
    }
}

/// Escape text for use in HTML content or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn text_block(text: &str) -> String {
    format!("<pre class=\"notes\">{}</pre>\n", escape_html(text))
}

/// Standalone page embedding `artifact_html` for `selection`.
pub fn embed_page(artifact_html: &str, selection: &Selection, opts: &RenderOptions) -> String {
    let name = selection.artifact_name();
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{} - {}</title>", TITLE, escape_html(&name));
    page.push_str(
        "<style>body { font-family: sans-serif; margin: 1.5em; } \
         pre.notes { white-space: pre-wrap; font-family: inherit; }</style>\n</head>\n<body>\n",
    );

    if opts.include_intro {
        let _ = writeln!(page, "<h1>{TITLE}</h1>");
        page.push_str("<h2>Introduction:</h2>\n");
        page.push_str(&text_block(INTRODUCTION));
        if selection.has_score_options()
            && let Some(method) = methodology(selection.geography)
        {
            page.push_str("<h3>How the exposure score is calculated:</h3>\n");
            page.push_str(&text_block(&method));
            let _ = writeln!(
                page,
                "<p>Exposure score: {} / {}</p>",
                selection.effective_aggregation(),
                selection.effective_weighting()
            );
            let _ = writeln!(page, "<p><em>{}</em></p>", escape_html(RATING_NOTE));
        }
    }

    let _ = writeln!(
        page,
        "<iframe title=\"{}\" srcdoc=\"{}\" style=\"width: 100%; height: {}px; border: none; overflow: auto;\" scrolling=\"yes\"></iframe>",
        escape_html(&name),
        escape_html(artifact_html),
        opts.frame_height
    );

    if selection.exposure == ExposureMetric::Exposure1997 {
        page.push_str(&legend_html());
    }
    page.push_str("</body>\n</html>\n");
    page
}

/// Read a downloaded artifact as UTF-8 text.
pub fn read_artifact<P: AsRef<Path>>(path: P) -> Result<String, RenderError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `file://` URL for a rendered page, percent-encoded.
pub fn file_url<P: AsRef<Path>>(page: P) -> Result<reqwest::Url, RenderError> {
    let page = page.as_ref();
    reqwest::Url::from_file_path(page).map_err(|()| RenderError::Url(page.to_path_buf()))
}

/// Read `artifact`, embed it and write the page to `out`.
pub fn render_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    artifact: P,
    selection: &Selection,
    out: Q,
    opts: &RenderOptions,
) -> Result<(), RenderError> {
    let html = read_artifact(artifact)?;
    let out = out.as_ref();
    fs::write(out, embed_page(&html, selection, opts)).map_err(|source| RenderError::Write {
        path: out.to_path_buf(),
        source,
    })?;
    log::info!("rendered {} to {}", selection.artifact_name(), out.display());
    Ok(())
}
