//! Social sharing
//!
//! Builds timestamped share links for the share menu. Opening windows and writing
//! to the clipboard are left to the host; this module only says what to do.

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::menus::{MenuItem, MenuState};
use crate::error::Result;
use crate::format::format_time;

const DEFAULT_SHARE_TEXT: &str = "Check out this video";
const SHARE_WINDOW: (u32, u32) = (600, 400);
const EMBED_SIZE: (u32, u32) = (560, 315);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTarget {
    CopyLink,
    Twitter,
    Facebook,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Embed,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 5] = [
        ShareTarget::CopyLink,
        ShareTarget::Twitter,
        ShareTarget::Facebook,
        ShareTarget::LinkedIn,
        ShareTarget::Embed,
    ];
}

/// What the host should do for a share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ShareAction {
    OpenWindow { url: Url, width: u32, height: u32 },
    CopyToClipboard { text: String },
}

/// Page URL with `t=<whole seconds>` when `timestamp > 0`
pub fn share_url(page: &Url, timestamp: Option<f64>) -> Url {
    let mut url = page.clone();
    let Some(ts) = timestamp.filter(|ts| *ts > 0.0) else {
        return url;
    };

    let kept: Vec<(String, String)> = page
        .query_pairs()
        .filter(|(key, _)| key != "t")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("t", &(ts.floor() as u64).to_string());
    url
}

/// `"<title> at M:SS"`, falling back to a generic line
pub fn share_text(title: Option<&str>, timestamp: Option<f64>) -> String {
    let title = title.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_SHARE_TEXT);
    match timestamp.filter(|ts| *ts > 0.0) {
        Some(ts) => format!("{} at {}", title, format_time(ts)),
        None => title.to_string(),
    }
}

/// Resolve a share target into a host action
pub fn share(target: ShareTarget, page: &Url, title: Option<&str>, timestamp: Option<f64>) -> Result<ShareAction> {
    let link = share_url(page, timestamp);
    let (width, height) = SHARE_WINDOW;

    let action = match target {
        ShareTarget::CopyLink => ShareAction::CopyToClipboard { text: link.to_string() },
        ShareTarget::Embed => ShareAction::CopyToClipboard {
            text: format!(
                r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
                link, EMBED_SIZE.0, EMBED_SIZE.1
            ),
        },
        ShareTarget::Twitter => ShareAction::OpenWindow {
            url: Url::parse_with_params(
                "https://twitter.com/intent/tweet",
                &[("url", link.as_str()), ("text", share_text(title, timestamp).as_str())],
            )?,
            width,
            height,
        },
        ShareTarget::Facebook => ShareAction::OpenWindow {
            url: Url::parse_with_params("https://www.facebook.com/sharer/sharer.php", &[("u", link.as_str())])?,
            width,
            height,
        },
        ShareTarget::LinkedIn => ShareAction::OpenWindow {
            url: Url::parse_with_params(
                "https://www.linkedin.com/sharing/share-offsite/",
                &[("url", link.as_str())],
            )?,
            width,
            height,
        },
    };

    info!(?target, ?timestamp, "Share");
    Ok(action)
}

/// Share menu for one page
#[derive(Debug, Clone)]
pub struct ShareMenu {
    pub menu: MenuState,
    page: Url,
    title: Option<String>,
}

impl ShareMenu {
    pub fn new(page: Url, title: Option<String>) -> Self {
        Self {
            menu: MenuState::default(),
            page,
            title,
        }
    }

    pub fn items(&self, current_time: f64) -> Vec<MenuItem<ShareTarget>> {
        ShareTarget::ALL
            .iter()
            .map(|&target| {
                let label = match target {
                    ShareTarget::CopyLink if current_time > 0.0 => {
                        format!("Copy link (at {})", format_time(current_time))
                    }
                    ShareTarget::CopyLink => "Copy link".to_string(),
                    ShareTarget::Twitter => "Twitter".to_string(),
                    ShareTarget::Facebook => "Facebook".to_string(),
                    ShareTarget::LinkedIn => "LinkedIn".to_string(),
                    ShareTarget::Embed => "Copy embed code".to_string(),
                };
                MenuItem {
                    value: target,
                    aria_label: label.clone(),
                    label,
                    active: false,
                }
            })
            .collect()
    }

    /// Choose a target; closes the menu
    pub fn select(&mut self, target: ShareTarget, current_time: f64) -> Result<ShareAction> {
        let action = share(target, &self.page, self.title.as_deref(), Some(current_time))?;
        self.menu.close();
        Ok(action)
    }
}
