use axum::{debug_handler, response::{Html, IntoResponse, Response}};
use tower_sessions::Session;

use crate::{
    components::{self, FeatureCard, Gradient, Icon, PetPhotoCard},
    include_res,
    res::fill,
    session, AppResult,
};

const SAMPLE_POSTS: [(&str, &str, &str, i64, i64, &str); 3] = [
    (
        "https://images.unsplash.com/photo-1552053831-71594a27632d?w=800",
        "Buddy", "sarah_petlover", 127, 23,
        "Morning walks are the best! 🌅 Buddy always finds the perfect spot for photos.",
    ),
    (
        "https://images.unsplash.com/photo-1514888286974-6c03e2ca1dba?w=800",
        "Whiskers", "cat_mom_jane", 89, 15,
        "This little one found the coziest window spot and won't move! 😸",
    ),
    (
        "https://images.unsplash.com/photo-1601758228041-f3b2795255f1?w=800",
        "Clover", "bunny_dad", 156, 31,
        "Garden time with my favorite bunny! She loves exploring the flowers 🌸",
    ),
];

const FEATURES: [FeatureCard; 3] = [
    FeatureCard {
        icon: Icon::Camera,
        title: "Share Pet Moments",
        description: "Upload and share your favorite pet photos with a loving community of pet enthusiasts.",
        gradient: Gradient::Coral,
    },
    FeatureCard {
        icon: Icon::Heart,
        title: "Connect with Pet Lovers",
        description: "Follow other pet parents, like their posts, and build meaningful connections.",
        gradient: Gradient::Mint,
    },
    FeatureCard {
        icon: Icon::Users,
        title: "Join Communities",
        description: "Find breed-specific groups, local pet meetups, and specialized communities.",
        gradient: Gradient::Warm,
    },
];

pub fn sample_posts() -> Vec<PetPhotoCard> {
    SAMPLE_POSTS.iter()
        .map(|&(image, pet_name, owner_name, likes, comments, caption)| PetPhotoCard {
            image: image.to_owned(),
            pet_name: pet_name.to_owned(),
            owner_name: owner_name.to_owned(),
            likes,
            comments,
            caption: caption.to_owned(),
        })
        .collect()
}

pub(crate) fn render(signed_in: bool) -> String {
    let account_links = if signed_in {
        r#"<a class="button hero" href="/feed">Go to your feed</a>"#
    } else {
        r#"<a class="button outline" href="/auth">Sign In</a> <a class="button hero" href="/auth">Join Now</a>"#
    };
    let samples: String = sample_posts().iter().map(components::pet_photo_card).collect();
    let features: String = FEATURES.iter().map(components::feature_card).collect();

    fill(
        include_res!(str, "/pages/landing.html"),
        &[
            ("logo", components::logo()),
            ("account_links", account_links),
            ("sample_posts", &samples),
            ("features", &features),
        ],
    )
}

#[debug_handler]
pub async fn index(session: Session) -> AppResult<Response> {
    let signed_in = session::identity(&session).await?.is_some();
    Ok(Html(render(signed_in)).into_response())
}
