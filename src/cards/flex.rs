//! Builders for the LINE Flex Message trees the bot replies with.
//!
//! Pure transformations: an `Activity` in, a bubble JSON tree out. LINE
//! rejects empty carousels, so list building degrades to plain text when
//! there is nothing to show.

use serde_json::{Value, json};

use crate::cards::BotReply;
use crate::store::Activity;

/// Hero image substituted when an activity has no image URL.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/1024x768";

/// Footer link substituted when an activity has no detail page.
pub const FALLBACK_LINK_URI: &str = "https://line.me/";

/// Upper bound on carousel size.
pub const MAX_CAROUSEL_BUBBLES: usize = 5;

/// Fixed text shown when the activity listing is empty.
pub const NO_ACTIVITIES_TEXT: &str = "目前沒有任何活動資訊。";

const INTRO_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";
const INTRO_PREVIEW_URL: &str = "https://www.nups.ntnu.edu.tw/upfiles/univ-expo/%E4%B8%AD%E9%83%A8/%E5%8D%97%E6%8A%95%E7%B8%A3/%E6%9A%A8%E5%8D%97/%E6%9A%A8%E5%8D%97-pic06.jpg";
const INTRO_ASPECT_RATIO: &str = "16:9";

/// A Flex Message: alt text for notification previews plus the bubble or
/// carousel tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexMessage {
    pub alt_text: String,
    pub contents: Value,
}

/// Build the detail bubble for one activity.
///
/// Slot order is fixed: title, end-date row, location row, description,
/// one link button.
pub fn activity_bubble(activity: &Activity) -> Value {
    let image_url = activity
        .image_url
        .as_deref()
        .unwrap_or(PLACEHOLDER_IMAGE_URL);
    let link_uri = activity
        .activity_link
        .as_deref()
        .unwrap_or(FALLBACK_LINK_URI);

    json!({
        "type": "bubble",
        "hero": {
            "type": "image",
            "url": image_url,
            "size": "full",
            "aspectRatio": "20:13",
            "aspectMode": "cover"
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {"type": "text", "text": activity.name, "weight": "bold", "size": "xl"},
                {
                    "type": "box",
                    "layout": "vertical",
                    "margin": "lg",
                    "spacing": "sm",
                    "contents": [
                        detail_row("結束日期", &activity.end_date.to_string()),
                        detail_row("地點", &activity.location)
                    ]
                },
                {
                    "type": "text",
                    "text": activity.description,
                    "wrap": true,
                    "margin": "md",
                    "color": "#666666"
                }
            ]
        },
        "footer": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": [
                {
                    "type": "button",
                    "style": "link",
                    "height": "sm",
                    "action": {"type": "uri", "label": "活動詳情", "uri": link_uri}
                }
            ],
            "flex": 0
        }
    })
}

fn detail_row(label: &str, value: &str) -> Value {
    json!({
        "type": "box",
        "layout": "baseline",
        "spacing": "sm",
        "contents": [
            {"type": "text", "text": label, "color": "#aaaaaa", "size": "sm", "flex": 2},
            {"type": "text", "text": value, "wrap": true, "color": "#666666", "size": "sm", "flex": 5}
        ]
    })
}

/// Wrap one activity as a full Flex reply.
pub fn activity_card(activity: &Activity) -> FlexMessage {
    FlexMessage {
        alt_text: format!("{} 活動資訊", activity.name),
        contents: activity_bubble(activity),
    }
}

/// Build the carousel reply for a listing.
///
/// Empty input degrades to the fixed no-results text; oversized input is
/// capped at [`MAX_CAROUSEL_BUBBLES`].
pub fn activity_carousel(activities: &[Activity]) -> BotReply {
    if activities.is_empty() {
        return BotReply::Text(NO_ACTIVITIES_TEXT.to_string());
    }

    let bubbles: Vec<Value> = activities
        .iter()
        .take(MAX_CAROUSEL_BUBBLES)
        .map(activity_bubble)
        .collect();

    BotReply::Flex(FlexMessage {
        alt_text: "最近活動列表".to_string(),
        contents: json!({"type": "carousel", "contents": bubbles}),
    })
}

/// The static studio-introduction bubble: video hero with an image
/// fallback, plus the about text. Fixed content, not data-layer logic.
pub fn intro_card() -> FlexMessage {
    FlexMessage {
        alt_text: "工作室介紹影片".to_string(),
        contents: json!({
            "type": "bubble",
            "hero": {
                "type": "video",
                "url": INTRO_VIDEO_URL,
                "previewUrl": INTRO_PREVIEW_URL,
                "altContent": {
                    "type": "image",
                    "size": "full",
                    "aspectRatio": INTRO_ASPECT_RATIO,
                    "aspectMode": "cover",
                    "url": INTRO_PREVIEW_URL
                },
                "aspectRatio": INTRO_ASPECT_RATIO
            },
            "body": {
                "type": "box",
                "layout": "vertical",
                "contents": [
                    {"type": "text", "text": "關於我們", "weight": "bold", "size": "xl"},
                    {
                        "type": "text",
                        "text": "我們是 AI Brand Bot 工作室，致力於將人工智慧技術應用於品牌行銷與客戶服務。",
                        "wrap": true,
                        "margin": "md",
                        "color": "#666666"
                    }
                ]
            }
        }),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_activity() -> Activity {
        Activity {
            id: 1,
            name: "台北馬拉松".to_string(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            location: "台北".to_string(),
            description: "年度路跑活動".to_string(),
            image_url: None,
            activity_link: None,
        }
    }

    #[test]
    fn bubble_falls_back_to_placeholder_image() {
        let bubble = activity_bubble(&sample_activity());
        assert_eq!(bubble["hero"]["url"], PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn bubble_falls_back_to_default_link() {
        let bubble = activity_bubble(&sample_activity());
        assert_eq!(
            bubble["footer"]["contents"][0]["action"]["uri"],
            FALLBACK_LINK_URI
        );
    }

    #[test]
    fn bubble_uses_activity_urls_when_present() {
        let mut activity = sample_activity();
        activity.image_url = Some("https://example.com/hero.jpg".to_string());
        activity.activity_link = Some("https://example.com/run".to_string());

        let bubble = activity_bubble(&activity);
        assert_eq!(bubble["hero"]["url"], "https://example.com/hero.jpg");
        assert_eq!(
            bubble["footer"]["contents"][0]["action"]["uri"],
            "https://example.com/run"
        );
    }

    #[test]
    fn bubble_slot_order_is_fixed() {
        let bubble = activity_bubble(&sample_activity());
        let body = bubble["body"]["contents"].as_array().unwrap();

        // title, detail block, description
        assert_eq!(body[0]["text"], "台北馬拉松");
        let details = body[1]["contents"].as_array().unwrap();
        assert_eq!(details[0]["contents"][0]["text"], "結束日期");
        assert_eq!(details[0]["contents"][1]["text"], "2025-12-01");
        assert_eq!(details[1]["contents"][0]["text"], "地點");
        assert_eq!(details[1]["contents"][1]["text"], "台北");
        assert_eq!(body[2]["text"], "年度路跑活動");

        let footer = bubble["footer"]["contents"].as_array().unwrap();
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0]["action"]["label"], "活動詳情");
    }

    #[test]
    fn activity_card_alt_text_names_the_activity() {
        let card = activity_card(&sample_activity());
        assert_eq!(card.alt_text, "台北馬拉松 活動資訊");
        assert_eq!(card.contents["type"], "bubble");
    }

    #[test]
    fn empty_carousel_degrades_to_text() {
        match activity_carousel(&[]) {
            BotReply::Text(text) => assert_eq!(text, NO_ACTIVITIES_TEXT),
            BotReply::Flex(_) => panic!("empty listing must not produce a flex message"),
        }
    }

    #[test]
    fn carousel_wraps_each_activity_as_a_bubble() {
        let activities = vec![sample_activity(), sample_activity()];
        let BotReply::Flex(flex) = activity_carousel(&activities) else {
            panic!("expected a flex carousel");
        };
        assert_eq!(flex.alt_text, "最近活動列表");
        assert_eq!(flex.contents["type"], "carousel");
        assert_eq!(flex.contents["contents"].as_array().unwrap().len(), 2);
        assert_eq!(flex.contents["contents"][0]["type"], "bubble");
    }

    #[test]
    fn carousel_is_capped() {
        let activities: Vec<Activity> = (0..8).map(|_| sample_activity()).collect();
        let BotReply::Flex(flex) = activity_carousel(&activities) else {
            panic!("expected a flex carousel");
        };
        assert_eq!(
            flex.contents["contents"].as_array().unwrap().len(),
            MAX_CAROUSEL_BUBBLES
        );
    }

    #[test]
    fn intro_card_is_constant() {
        let card = intro_card();
        assert_eq!(card.alt_text, "工作室介紹影片");
        assert_eq!(card.contents["hero"]["type"], "video");
        assert_eq!(card.contents["hero"]["altContent"]["type"], "image");
        assert_eq!(card.contents["body"]["contents"][0]["text"], "關於我們");
        // Same document every time.
        assert_eq!(card, intro_card());
    }
}
