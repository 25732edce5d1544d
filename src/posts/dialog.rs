use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    components::Toast,
    include_res,
    models::{Identity, Post},
    res::{escape_html, fill},
};

pub(crate) const EMPTY_DRAFT: &str = "Please add a caption or image";
pub(crate) const STILL_SUBMITTING: &str = "Your post is still being shared";
pub(crate) const SHARED: &str = "Your post has been shared with the community";
pub(crate) const FAILED: &str = "Failed to create post. Please try again.";

/// A submit that has not finished after this long is assumed to be lost
/// (dropped connection, crashed worker) and no longer blocks the dialog.
pub(crate) const SUBMIT_TIMEOUT: Duration = Duration::minutes(2);

/// Per-user state of the "share a moment" dialog. Lives in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostDialog {
    pub open: bool,
    pub caption: String,
    pub image_url: String,
    pub submitting: bool,
    /// Unix seconds at which the outstanding submit started.
    #[serde(default)]
    pub submitting_since: Option<i64>,
}

/// A validated draft, trimmed, with blank fields dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub caption: Option<String>,
    pub image_url: Option<String>,
}

impl Draft {
    pub fn new(caption: &str, image_url: &str) -> Self {
        fn non_blank(s: &str) -> Option<String> {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Draft { caption: non_blank(caption), image_url: non_blank(image_url) }
    }

    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.image_url.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub viewer: Identity,
    pub draft: Draft,
}

impl CreatePostDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Releases a submit claim older than `SUBMIT_TIMEOUT`. The draft is kept.
    pub fn recover_stale(&mut self, now: OffsetDateTime) {
        let Some(since) = self.submitting_since.filter(|_| self.submitting) else {
            return;
        };
        if now.unix_timestamp() - since >= SUBMIT_TIMEOUT.whole_seconds() {
            tracing::warn!(since, "releasing a stale post submit");
            self.submitting = false;
            self.submitting_since = None;
        }
    }

    /// Returns false when the close was suppressed by an outstanding submit.
    pub fn close(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.open = false;
        self.caption.clear();
        self.image_url.clear();
        true
    }

    pub fn set_draft(&mut self, caption: String, image_url: String) {
        if self.submitting {
            return;
        }
        self.caption = caption;
        self.image_url = image_url;
    }

    pub fn clear_image(&mut self) {
        if !self.submitting {
            self.image_url.clear();
        }
    }

    /// The preview could not load the URL as an image.
    pub fn preview_failed(&mut self) {
        self.clear_image();
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !Draft::new(&self.caption, &self.image_url).is_empty()
    }

    /// Validates the draft and marks the dialog as submitting. Nothing is
    /// sent anywhere when this returns an error.
    pub fn begin_submit(&mut self, viewer: Option<&Identity>) -> Result<Submission, Toast> {
        if self.submitting {
            return Err(Toast::error(STILL_SUBMITTING));
        }
        let draft = Draft::new(&self.caption, &self.image_url);
        let Some(viewer) = viewer else {
            return Err(Toast::error(EMPTY_DRAFT));
        };
        if draft.is_empty() {
            return Err(Toast::error(EMPTY_DRAFT));
        }

        self.submitting = true;
        self.submitting_since = Some(OffsetDateTime::now_utc().unix_timestamp());
        Ok(Submission { viewer: viewer.clone(), draft })
    }

    pub fn finish(&mut self, result: &anyhow::Result<Post>) -> Toast {
        self.submitting = false;
        self.submitting_since = None;
        match result {
            Ok(_) => {
                self.close();
                Toast::success(SHARED)
            }
            Err(_) => Toast::error(FAILED),
        }
    }

    pub fn render(&self) -> String {
        // Always present so the browser can preview a URL as it is typed.
        let src = if self.image_url.is_empty() {
            String::new()
        } else {
            format!("src=\"{}\"", escape_html(&self.image_url))
        };
        let preview = fill(
            include_res!(str, "/components/image_preview.html"),
            &[
                ("hidden", if self.image_url.is_empty() { "hidden" } else { "" }),
                ("src", &src),
                ("disabled", disabled(self.submitting)),
            ],
        );

        fill(
            include_res!(str, "/components/create_post_dialog.html"),
            &[
                ("open", if self.open { "open" } else { "" }),
                ("caption", &escape_html(&self.caption)),
                ("image_url", &escape_html(&self.image_url)),
                ("preview", &preview),
                ("disabled", disabled(self.submitting)),
                ("submit_disabled", disabled(!self.can_submit())),
                ("submit_label", if self.submitting { "Sharing..." } else { "Share Post" }),
            ],
        )
    }
}

fn disabled(yes: bool) -> &'static str {
    if yes { "disabled" } else { "" }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    fn viewer() -> Identity {
        Identity::local(Uuid::from_u128(1))
    }

    fn drafted(caption: &str, image_url: &str) -> CreatePostDialog {
        let mut dialog = CreatePostDialog::default();
        dialog.open();
        dialog.set_draft(caption.to_owned(), image_url.to_owned());
        dialog
    }

    fn created() -> anyhow::Result<Post> {
        Ok(Post {
            id: Uuid::from_u128(9),
            caption: Some("Hello".to_owned()),
            likes_count: 0,
            comments_count: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            user_id: Uuid::from_u128(1),
            post_images: vec![],
        })
    }

    #[test]
    fn blank_draft_is_rejected() {
        let mut dialog = drafted("   ", "\t");
        assert!(!dialog.can_submit());
        assert_eq!(dialog.begin_submit(Some(&viewer())), Err(Toast::error(EMPTY_DRAFT)));
        assert!(!dialog.submitting);
    }

    #[test]
    fn missing_user_is_rejected() {
        let mut dialog = drafted("Hello", "");
        assert!(dialog.begin_submit(None).is_err());
        assert!(!dialog.submitting);
    }

    #[test]
    fn begin_submit_trims_and_marks_submitting() {
        let mut dialog = drafted("  Hello  ", "   ");
        let submission = dialog.begin_submit(Some(&viewer())).unwrap();
        assert_eq!(submission.draft, Draft { caption: Some("Hello".to_owned()), image_url: None });
        assert!(dialog.submitting);
        assert!(!dialog.can_submit());
    }

    #[test]
    fn second_submit_while_submitting_is_rejected() {
        let mut dialog = drafted("Hello", "");
        dialog.begin_submit(Some(&viewer())).unwrap();
        assert_eq!(dialog.begin_submit(Some(&viewer())), Err(Toast::error(STILL_SUBMITTING)));
    }

    #[test]
    fn close_is_suppressed_while_submitting() {
        let mut dialog = drafted("Hello", "a.jpg");
        dialog.begin_submit(Some(&viewer())).unwrap();
        assert!(!dialog.close());
        assert!(dialog.open);
        assert_eq!(dialog.caption, "Hello");
    }

    #[test]
    fn draft_is_frozen_while_submitting() {
        let mut dialog = drafted("Hello", "a.jpg");
        dialog.begin_submit(Some(&viewer())).unwrap();
        dialog.set_draft("changed".to_owned(), String::new());
        dialog.preview_failed();
        assert_eq!(dialog.caption, "Hello");
        assert_eq!(dialog.image_url, "a.jpg");
    }

    #[test]
    fn success_resets_and_closes() {
        let mut dialog = drafted("Hello", "a.jpg");
        dialog.begin_submit(Some(&viewer())).unwrap();
        let toast = dialog.finish(&created());
        assert_eq!(toast, Toast::success(SHARED));
        assert_eq!(dialog, CreatePostDialog::default());
    }

    #[test]
    fn failure_keeps_the_draft() {
        let mut dialog = drafted("Hello", "a.jpg");
        dialog.begin_submit(Some(&viewer())).unwrap();
        let toast = dialog.finish(&Err(anyhow!("boom")));
        assert_eq!(toast, Toast::error(FAILED));
        assert!(dialog.open);
        assert!(!dialog.submitting);
        assert_eq!((dialog.caption.as_str(), dialog.image_url.as_str()), ("Hello", "a.jpg"));
    }

    #[test]
    fn preview_failure_clears_image_url() {
        let mut dialog = drafted("Hello", "https://example.com/not-an-image");
        dialog.preview_failed();
        assert_eq!(dialog.image_url, "");
        assert_eq!(dialog.caption, "Hello");
    }

    #[test]
    fn close_discards_the_draft() {
        let mut dialog = drafted("Hello", "a.jpg");
        assert!(dialog.close());
        assert_eq!(dialog, CreatePostDialog::default());
    }

    #[test]
    fn render_reflects_state() {
        let closed = CreatePostDialog::default().render();
        assert!(closed.contains("Share Post"));

        let mut dialog = drafted("<i>hi</i>", "a.jpg");
        let html = dialog.render();
        assert!(html.contains("<div class=\"preview\" >"));
        assert!(html.contains("src=\"a.jpg\""));
        assert!(html.contains("&lt;i&gt;hi&lt;/i&gt;"));

        dialog.begin_submit(Some(&viewer())).unwrap();
        assert!(dialog.render().contains("Sharing..."));
    }

    #[test]
    fn empty_draft_still_has_a_hidden_preview() {
        let html = drafted("Hello", "").render();
        assert!(html.contains("<div class=\"preview\" hidden>"));
        assert!(html.contains("alt=\"Preview\""));
        assert!(html.contains("preview-failed"));
        assert!(!html.contains("src=\""));
    }

    #[test]
    fn stale_submit_is_released() {
        let mut dialog = drafted("Hello", "a.jpg");
        dialog.begin_submit(Some(&viewer())).unwrap();
        let started = OffsetDateTime::from_unix_timestamp(dialog.submitting_since.unwrap()).unwrap();

        dialog.recover_stale(started + Duration::seconds(5));
        assert!(dialog.submitting);
        assert!(!dialog.close());

        dialog.recover_stale(started + SUBMIT_TIMEOUT);
        assert!(!dialog.submitting);
        assert_eq!(dialog.submitting_since, None);
        assert_eq!((dialog.caption.as_str(), dialog.image_url.as_str()), ("Hello", "a.jpg"));
        assert!(dialog.can_submit());
    }
}
