// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns message attachments into prompts the model can answer.
//!
//! The model never sees the file itself. Images and GIFs are described by
//! whatever their link or file name reveals; other files only by name.

use std::sync::LazyLock;

use crax_core::types::Attachment;
use regex::Regex;

static IMAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(gif|jpg|jpeg|png|webp)$").unwrap());
static IMAGE_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tenor\.com|giphy\.com|imgur\.com|\.gif").unwrap());
static TENOR_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tenor\.com/view/([\w-]+)").unwrap());
static GIPHY_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)giphy\.com/gifs/([\w-]+)").unwrap());
static EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Whether the attachment looks like an image or GIF.
pub fn is_visual(attachment: &Attachment) -> bool {
    IMAGE_NAME.is_match(&attachment.name) || IMAGE_HOST.is_match(&attachment.url)
}

/// Best readable description of a visual attachment.
///
/// A tenor `/view/` or giphy `/gifs/` slug wins over the file name.
pub fn describe(attachment: &Attachment) -> String {
    let slug = TENOR_SLUG
        .captures(&attachment.url)
        .or_else(|| GIPHY_SLUG.captures(&attachment.url));
    if let Some(slug) = slug.and_then(|c| c.get(1)) {
        return slug.as_str().replace('-', " ");
    }

    let spaced = attachment.name.replace(['-', '_'], " ");
    EXTENSION.replace(&spaced, "").into_owned()
}

/// The prompt sent to the dispatcher for one attachment.
pub fn prompt_for(attachment: &Attachment) -> String {
    if !is_visual(attachment) {
        return format!("A user posted a file named: {}.", attachment.name);
    }
    format!(
        "A user posted a GIF or image: \"{}\". React with a very short, sassy, human-like \
         comment about what the GIF or image might show, based on this description. \
         Don't mention being an AI or bot. Use the user's display name if needed. \
         Never say you can't see the image. Never just say 'hey there' or 'what's up'.",
        describe(attachment)
    )
}
