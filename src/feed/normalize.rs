use crate::store::types::{RawItem, RawPost, RawVideo};

use super::types::{ContentEnvelope, Payload, PostPayload, VideoPayload};

pub fn normalize(item: RawItem) -> ContentEnvelope {
    match item {
        RawItem::Video(v) => video(v),
        RawItem::Post(p) => post(p),
    }
}

/// Views are the popularity score of a video.
pub fn video(raw: RawVideo) -> ContentEnvelope {
    ContentEnvelope {
        id: raw.id,
        created_at: raw.created_at,
        popularity_score: raw.views,
        owner: raw.owner,
        payload: Payload::Video(VideoPayload {
            title: raw.title,
            description: raw.description,
            thumbnail: raw.thumbnail,
            video_file: raw.video_file,
            duration: raw.duration,
            views: raw.views,
        }),
    }
}

/// Likes are the popularity score of a post.
pub fn post(raw: RawPost) -> ContentEnvelope {
    ContentEnvelope {
        id: raw.id,
        created_at: raw.created_at,
        popularity_score: raw.likes,
        owner: raw.owner,
        payload: Payload::Post(PostPayload {
            title: raw.title,
            content: raw.content,
            likes: raw.likes,
        }),
    }
}
