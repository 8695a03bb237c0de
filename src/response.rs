// ABOUTME: Parsing of the service's Atom entry response into a PostResult
// ABOUTME: Missing fields become explicit defaults; only broken XML or timestamps are errors

use chrono::{DateTime, FixedOffset};

use crate::entry::Timestamp;
use crate::error::Result;
use crate::xml::{find_attr, find_text, Element, Namespaces};

/// Status the service returns when an entry is created
pub const STATUS_CREATED: u16 = 201;

const EDIT_API_SEGMENT: &str = "atom/entry/";
const EDITOR_SEGMENT: &str = "edit?entry=";

/// Raw outcome of the signed POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostResult {
    pub status_code: u16,
    pub title: String,
    pub author: String,
    pub content: String,
    pub time: DateTime<FixedOffset>,
    /// AtomPub member URI of the entry
    pub link_edit: String,
    /// Browser editor URL on the same host
    pub link_edit_user: String,
    /// Public URL of the entry
    pub link_alternate: String,
    pub categories: Vec<String>,
    pub is_draft: bool,
}

impl PostResult {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_CREATED
    }
}

/// Turn the AtomPub edit URI into the human-facing editor URL
///
/// `https://blog.hatena.ne.jp/u/b/atom/entry/123` becomes
/// `https://blog.hatena.ne.jp/u/b/edit?entry=123`.
pub fn editor_url(link_edit: &str) -> String {
    link_edit.replace(EDIT_API_SEGMENT, EDITOR_SEGMENT)
}

/// Parse a response body regardless of its status code
pub fn parse_response(response: &HttpResponse) -> Result<PostResult> {
    let ns = Namespaces::atompub();
    let root = Element::parse(&response.body)?;

    let categories = root
        .find_all("atom:category", &ns)
        .into_iter()
        .filter_map(|category| category.attribute("term"))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect();

    let link_edit = find_attr(&root, "atom:link[@rel='edit']", "href", &ns, "");
    let link_edit_user = editor_url(&link_edit);

    let time = find_text(&root, "atom:updated", &ns, "")
        .parse::<Timestamp>()?
        .resolve()?;

    Ok(PostResult {
        status_code: response.status_code,
        title: find_text(&root, "atom:title", &ns, ""),
        author: find_text(&root, "atom:author/atom:name", &ns, ""),
        content: find_text(&root, "atom:content", &ns, ""),
        time,
        link_edit,
        link_edit_user,
        link_alternate: find_attr(&root, "atom:link[@rel='alternate']", "href", &ns, ""),
        categories,
        is_draft: find_text(&root, "app:control/app:draft", &ns, "") == "yes",
    })
}
