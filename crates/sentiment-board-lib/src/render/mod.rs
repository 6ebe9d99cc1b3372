//! Server-side HTML rendering of the board.
//!
//! `render_page` is a pure function of the session's records, the active sort
//! option and the page settings; the whole page is rebuilt on every
//! interaction, so there is no incremental update logic anywhere.

pub mod chart;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{
    comment_record::{CommentRecord, DEFAULT_USERNAME},
    sentiment::{SentimentLabel, SortOption},
};
use crate::service;
use crate::stats::SentimentSummary;

pub const POSITIVE_BACKGROUND: &str = "#DFF0D8";
pub const NEGATIVE_BACKGROUND: &str = "#F2DEDE";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Video shown under the title.
pub const DEFAULT_VIDEO_URL: &str = "https://youtu.be/jSgdL1zX4h8?si=PLXncne9ga_gGIWq";
pub const DEFAULT_COMMENT: &str = "Amazing video";
pub const PAGE_TITLE: &str = "Sentiment Analyzer";

/// Static, per-deployment page content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageSettings {
    pub title: String,
    pub video_url: String,
    pub default_username: String,
    pub default_comment: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            title: PAGE_TITLE.to_string(),
            video_url: DEFAULT_VIDEO_URL.to_string(),
            default_username: DEFAULT_USERNAME.to_string(),
            default_comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

/// Everything one render needs.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    /// The full, unfiltered store contents.
    pub records: &'a [CommentRecord],
    pub sort: SortOption,
    pub settings: &'a PageSettings,
}

// ---------------------------------------------------------------------------
// HTML escaping
// ---------------------------------------------------------------------------

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;").replace('\'', "&#39;")
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Background colour keyed by sentiment; unknown labels get white.
pub fn background_for(label: &SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => POSITIVE_BACKGROUND,
        SentimentLabel::Negative => NEGATIVE_BACKGROUND,
        SentimentLabel::Other(_) => DEFAULT_BACKGROUND,
    }
}

/// Turn a share/watch link into an embeddable player URL. Anything that is
/// not a recognised YouTube link is used as-is.
pub fn embed_url(video_url: &str) -> String {
    let trimmed = video_url.trim();
    let id = if let Some(rest) = trimmed
        .strip_prefix("https://youtu.be/")
        .or_else(|| trimmed.strip_prefix("http://youtu.be/"))
    {
        rest.split(['?', '&', '#']).next()
    } else if let Some(pos) = trimmed.find("youtube.com/watch") {
        trimmed[pos..]
            .split(['?', '&'])
            .find_map(|part| part.strip_prefix("v="))
    } else {
        None
    };
    match id.filter(|id| !id.is_empty()) {
        Some(id) => format!("https://www.youtube.com/embed/{}", id),
        None => trimmed.to_string(),
    }
}

/// One styled comment block.
pub fn comment_block(record: &CommentRecord) -> String {
    let background = background_for(record.sentiment());
    format!(
        r#"<div class="comment-box" style="background-color: {background}; padding: 15px; border-radius: 10px; box-shadow: 0px 2px 5px 0px rgba(0, 0, 0, 0.1); margin-bottom: 20px;">
  <div class="comment-header" style="display: flex; align-items: center; justify-content: space-between; margin-bottom: 10px;">
    <span class="username" style="font-weight: bold; color: #333;">{username}</span>
    <span class="sentiment" style="color: #555; font-style: italic;">{sentiment}</span>
  </div>
  <div class="comment-text" style="color: #333;">{text}</div>
</div>
"#,
        username = html_escape(record.username()),
        sentiment = html_escape(record.sentiment().as_str()),
        text = html_escape(record.text()),
    )
}

/// The "Overall Comments Analysis" sidebar.
pub fn sidebar(summary: &SentimentSummary) -> String {
    let mut out = String::new();
    out.push_str("<aside class=\"sidebar\">\n<h2>Overall Comments Analysis</h2>\n");
    let _ = writeln!(out, "<p class=\"total\">Total Comments: {}</p>", summary.total);
    let _ = writeln!(
        out,
        "<p class=\"positive\">Positive Comments: {} ({:.2}%)</p>",
        summary.positive, summary.positive_percentage
    );
    let _ = writeln!(
        out,
        "<p class=\"negative\">Negative Comments: {} ({:.2}%)</p>",
        summary.negative, summary.negative_percentage
    );
    if let Some(svg) = chart::pie_chart_svg(summary) {
        out.push_str("<h3>Comments Distribution</h3>\n");
        out.push_str(&svg);
        out.push('\n');
    }
    out.push_str("</aside>\n");
    out
}

fn sort_selector(current: SortOption) -> String {
    let mut options = String::new();
    for opt in SortOption::ALL {
        let selected = if opt == current { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{v}"{selected}>{v}</option>"#,
            v = opt.as_str()
        );
    }
    format!(
        r#"<form class="sort" method="get" action="/">
  <label for="sort">Sort Comments by Sentiment:</label>
  <select id="sort" name="sort" onchange="this.form.submit()">{options}</select>
  <noscript><button type="submit">Apply</button></noscript>
</form>
"#
    )
}

/// Prefills the username with the most recent commenter's name.
fn comment_form(settings: &PageSettings, records: &[CommentRecord], sort: SortOption) -> String {
    let username = records
        .last()
        .map(CommentRecord::username)
        .unwrap_or(settings.default_username.as_str());
    format!(
        r#"<form class="add-comment" method="post" action="/comments">
  <label for="username">Enter your username</label>
  <input id="username" name="username" type="text" value="{username}">
  <label for="comment">Enter your comment</label>
  <textarea id="comment" name="comment" rows="3">{comment}</textarea>
  <input type="hidden" name="sort" value="{sort}">
  <button type="submit">Add Comment</button>
</form>
"#,
        username = html_attr_escape(username),
        comment = html_escape(&settings.default_comment),
        sort = sort.as_str(),
    )
}

const STYLE: &str = r#"
body { font-family: "Source Sans Pro", sans-serif; margin: 0; display: flex; min-height: 100vh; color: #31333F; }
.sidebar { width: 300px; flex-shrink: 0; background: #F0F2F6; padding: 24px; box-sizing: border-box; }
.sidebar svg { width: 100%; height: auto; }
main { flex: 1; max-width: 730px; margin: 0 auto; padding: 32px 24px; }
form.add-comment label, form.sort label { display: block; margin: 12px 0 4px; font-size: 14px; }
form.add-comment input[type=text], form.add-comment textarea { width: 100%; box-sizing: border-box; padding: 8px; font: inherit; }
form.add-comment button { margin-top: 12px; padding: 6px 14px; }
.video { position: relative; padding-bottom: 56.25%; height: 0; margin-bottom: 32px; }
.video iframe { position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0; }
"#;

const FAVICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>😃</text></svg>";

/// Render the whole page.
pub fn render_page(view: &PageView<'_>) -> String {
    let summary = SentimentSummary::from_records(view.records);
    let filtered = service::filter(view.records, view.sort);

    let mut comments = String::new();
    for record in filtered {
        comments.push_str(&comment_block(record));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="icon" href="{favicon}">
<style>{style}</style>
</head>
<body>
{sidebar}<main>
<h1 style="text-align: center; color: #2A61D3; margin-bottom: 30px;">{title}</h1>
<div class="video"><iframe src="{video}" title="Video" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>
{form}{selector}<h2>Comments</h2>
<section class="comments">
{comments}</section>
</main>
</body>
</html>
"#,
        title = html_escape(&view.settings.title),
        favicon = FAVICON,
        style = STYLE,
        sidebar = sidebar(&summary),
        video = html_attr_escape(&embed_url(&view.settings.video_url)),
        form = comment_form(view.settings, view.records, view.sort),
        selector = sort_selector(view.sort),
        comments = comments,
    )
}

/// Bare page shown when an interaction fails (e.g. the classifier errored).
pub fn render_error_page(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<h1>{title}</h1>
<p>{message}</p>
<p><a href="/">Back</a></p>
</body>
</html>
"#,
        title = html_escape(title),
        message = html_escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(user: &str, text: &str, label: &str) -> CommentRecord {
        CommentRecord::new(user, text, SentimentLabel::from_raw(label))
    }

    #[test]
    fn test_block_colours_by_sentiment() {
        assert!(comment_block(&rec("a", "x", "POSITIVE")).contains(POSITIVE_BACKGROUND));
        assert!(comment_block(&rec("a", "x", "NEGATIVE")).contains(NEGATIVE_BACKGROUND));
        let neutral = comment_block(&rec("a", "x", "NEUTRAL"));
        assert!(neutral.contains(DEFAULT_BACKGROUND));
        assert!(neutral.contains(">NEUTRAL<"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let block = comment_block(&rec("<b>eve</b>", "<script>alert(1)</script>", "POSITIVE"));
        assert!(!block.contains("<script>"));
        assert!(block.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(block.contains("&lt;b&gt;eve&lt;/b&gt;"));
    }

    #[test]
    fn test_embed_url_forms() {
        assert_eq!(
            embed_url(DEFAULT_VIDEO_URL),
            "https://www.youtube.com/embed/jSgdL1zX4h8"
        );
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123&t=10"),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(embed_url("https://example.com/v.mp4"), "https://example.com/v.mp4");
    }

    #[test]
    fn test_sidebar_uses_full_store_and_two_decimals() {
        let records = vec![rec("a", "x", "POSITIVE"), rec("b", "y", "NEGATIVE")];
        let html = sidebar(&SentimentSummary::from_records(&records));
        assert!(html.contains("Total Comments: 2"));
        assert!(html.contains("Positive Comments: 1 (50.00%)"));
        assert!(html.contains("Negative Comments: 1 (50.00%)"));
        assert!(html.contains("Comments Distribution"));
    }

    #[test]
    fn test_empty_page_has_no_chart() {
        let settings = PageSettings::default();
        let html = render_page(&PageView {
            records: &[],
            sort: SortOption::None,
            settings: &settings,
        });
        assert!(html.contains("Total Comments: 0"));
        assert!(html.contains("Positive Comments: 0 (0.00%)"));
        assert!(!html.contains("Comments Distribution"));
        assert!(!html.contains("<svg class=\"pie-chart\""));
        assert!(html.contains(r#"value="User""#));
        assert!(html.contains(">Amazing video</textarea>"));
    }

    #[test]
    fn test_page_filters_list_but_not_sidebar() {
        let settings = PageSettings::default();
        let records = vec![
            rec("Alice", "I love this!", "POSITIVE"),
            rec("Bob", "I hate this.", "NEGATIVE"),
        ];
        let html = render_page(&PageView {
            records: &records,
            sort: SortOption::Negative,
            settings: &settings,
        });
        assert_eq!(html.matches("class=\"comment-box\"").count(), 1);
        assert!(html.contains(">Bob<"));
        assert!(!html.contains(">Alice<"));
        assert!(html.contains("Total Comments: 2"));
        assert!(html.contains(r#"<option value="Negative" selected>"#));
    }

    #[test]
    fn test_form_keeps_last_username_but_resets_comment() {
        let settings = PageSettings::default();
        let records = vec![
            rec("Alice", "I love this!", "POSITIVE"),
            rec("Bob \"B\"", "I hate this.", "NEGATIVE"),
        ];
        let html = render_page(&PageView {
            records: &records,
            sort: SortOption::None,
            settings: &settings,
        });
        assert!(html.contains(r#"name="username" type="text" value="Bob &quot;B&quot;""#));
        assert!(html.contains(">Amazing video</textarea>"));
    }
}
