//! Presentational pieces shared by the pages. Every function here only turns
//! data into HTML.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::{include_res, res::{escape_html, fill}};

pub fn logo() -> &'static str {
    include_res!(str, "/components/logo.html")
}

#[derive(Debug, Clone, PartialEq)]
pub struct PetPhotoCard {
    pub image: String,
    pub pet_name: String,
    pub owner_name: String,
    pub likes: i64,
    pub comments: i64,
    pub caption: String,
}

pub fn pet_photo_card(card: &PetPhotoCard) -> String {
    fill(
        include_res!(str, "/components/pet_photo_card.html"),
        &[
            ("image", &escape_html(&card.image)),
            ("pet_name", &escape_html(&card.pet_name)),
            ("owner_name", &escape_html(&card.owner_name)),
            ("likes", &card.likes.to_string()),
            ("comments", &card.comments.to_string()),
            ("caption", &caption_html(&card.caption)),
        ],
    )
}

/// Captions are markdown. Raw HTML is shown as text and links or images are
/// reduced to their text.
pub fn caption_html(caption: &str) -> String {
    let parser = Parser::new(caption)
        .filter(|event| !matches!(
            event,
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) | Event::End(TagEnd::Link | TagEnd::Image)
        ))
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gradient {
    Coral,
    Mint,
    #[default]
    Warm,
}

impl Gradient {
    pub fn class(self) -> &'static str {
        match self {
            Gradient::Coral => "gradient-coral",
            Gradient::Mint => "gradient-mint",
            Gradient::Warm => "gradient-warm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Camera,
    Heart,
    Users,
}

impl Icon {
    fn glyph(self) -> &'static str {
        match self {
            Icon::Camera => "📷",
            Icon::Heart => "♥",
            Icon::Users => "👥",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCard {
    pub icon: Icon,
    pub title: &'static str,
    pub description: &'static str,
    pub gradient: Gradient,
}

pub fn feature_card(card: &FeatureCard) -> String {
    fill(
        include_res!(str, "/components/feature_card.html"),
        &[
            ("gradient", card.gradient.class()),
            ("icon", card.icon.glyph()),
            ("title", &escape_html(card.title)),
            ("description", &escape_html(card.description)),
        ],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// One-shot notification shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(description: &str) -> Self {
        Toast { title: "Success!".to_owned(), description: description.to_owned(), variant: ToastVariant::Default }
    }

    pub fn error(description: &str) -> Self {
        Toast { title: "Error".to_owned(), description: description.to_owned(), variant: ToastVariant::Destructive }
    }
}

pub fn toast(toast: Option<&Toast>) -> String {
    let Some(toast) = toast else {
        return String::new();
    };
    let variant = match toast.variant {
        ToastVariant::Default => "toast",
        ToastVariant::Destructive => "toast toast-destructive",
    };
    fill(
        include_res!(str, "/components/toast.html"),
        &[
            ("variant", variant),
            ("title", &escape_html(&toast.title)),
            ("description", &escape_html(&toast.description)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rex() -> PetPhotoCard {
        PetPhotoCard {
            image: "a.jpg".to_owned(),
            pet_name: "Rex".to_owned(),
            owner_name: "sam".to_owned(),
            likes: 4,
            comments: 2,
            caption: "Walk".to_owned(),
        }
    }

    #[test]
    fn pet_photo_card_shows_pet_owner_and_image() {
        let html = pet_photo_card(&rex());
        assert!(html.contains(r#"src="a.jpg""#));
        assert!(html.contains(r#"alt="Rex the pet""#));
        assert!(html.contains("by @sam"));
        assert!(html.contains("<p>Walk</p>"));
        assert!(html.contains(r#"<span class="count">4</span>"#));
        assert!(html.contains(r#"<span class="count">2</span>"#));
    }

    #[test]
    fn pet_photo_card_escapes_user_text() {
        let card = PetPhotoCard {
            pet_name: "<b>Rex</b>".to_owned(),
            image: r#"x" onerror="alert(1)"#.to_owned(),
            ..rex()
        };
        let html = pet_photo_card(&card);
        assert!(!html.contains("<b>Rex</b>"));
        assert!(!html.contains(r#"onerror="alert(1)""#));
    }

    #[test]
    fn caption_markdown_neutralises_html_and_links() {
        let html = caption_html("**good** boy <script>x()</script> [click](javascript:alert(1))");
        assert!(html.contains("<strong>good</strong>"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click"));
    }

    #[test]
    fn feature_card_defaults_to_warm() {
        let html = feature_card(&FeatureCard {
            icon: Icon::Camera,
            title: "Share Pet Moments",
            description: "Upload photos",
            gradient: Gradient::default(),
        });
        assert!(html.contains("gradient-warm"));
        assert!(html.contains("Share Pet Moments"));
    }

    #[test]
    fn no_toast_renders_nothing() {
        assert_eq!(toast(None), "");
        assert!(toast(Some(&Toast::error("Please add a caption or image"))).contains("toast-destructive"));
    }
}
