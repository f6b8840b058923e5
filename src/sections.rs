//! Section renderers.
//!
//! Each function maps one slice of the [content document](crate::content) to
//! a markup fragment. They are pure apart from resolving image references
//! through the [`ImagePolicy`], which may record a warning.
//!
//! Cards carry a `data-d` *stagger index* that only offsets their entrance
//! animation. The first card of a group has none.

use crate::assets::ImagePolicy;
use crate::content::{
    Album, Class, EmbedAlbum, EventPlaceholder, FlipCard, GearCategory, LinkList, Service,
    Testimonial, Video,
};
use maud::{Markup, PreEscaped, html};

/// Number of gear categories shown before the "full rig" toggle.
pub const HIGHLIGHTED_GEAR: usize = 3;

/// Stagger index for the card at `position` in a plain group.
pub fn stagger(position: usize) -> Option<usize> {
    (position > 0).then_some(position)
}

/// Stagger index for the card at `position` in the gear overflow group.
///
/// The overflow grid can be long, so delays cycle through 1..=4.
pub fn overflow_stagger(position: usize) -> Option<usize> {
    (position > 0).then_some(position % 4 + 1)
}

/// Split gear categories into the always-visible group and the overflow.
pub fn split_gear(categories: &[GearCategory]) -> (&[GearCategory], &[GearCategory]) {
    categories.split_at(categories.len().min(HIGHLIGHTED_GEAR))
}

fn gradient(colors: &[String; 3]) -> String {
    format!(
        "background:linear-gradient(135deg,{},{} 40%,{})",
        colors[0], colors[1], colors[2]
    )
}

fn bandcamp_player_url(album_id: &str) -> String {
    format!(
        "https://bandcamp.com/EmbeddedPlayer/album={album_id}/size=large/bgcol=2A1A22/linkcol=FF9090/artwork=small/transparent=true/"
    )
}

// ============================================================================
// Gear
// ============================================================================

fn gear_card(category: &GearCategory, stagger: Option<usize>) -> Markup {
    html! {
        div.gear-cat.rv data-d=[stagger] {
            h3 {
                (category.name)
                span.gear-count { (category.items.len()) }
            }
            ul {
                @for item in &category.items {
                    li {
                        (item.name)
                        @if let Some(note) = item.note.as_deref().filter(|n| !n.is_empty()) {
                            span.note { (note) }
                        }
                    }
                }
            }
        }
    }
}

/// Gear grid: highlighted categories, then the collapsed overflow and its toggle.
pub fn gear(categories: &[GearCategory]) -> Markup {
    let (highlighted, overflow) = split_gear(categories);
    html! {
        div.gear-grid {
            @for (i, category) in highlighted.iter().enumerate() {
                (gear_card(category, stagger(i)))
            }
        }
        div #gear-full .gear-full-wrap style="max-height:0;overflow:hidden;transition:max-height .6s cubic-bezier(.16,1,.3,1)" {
            div.gear-grid style="margin-top:18px" {
                @for (i, category) in overflow.iter().enumerate() {
                    (gear_card(category, overflow_stagger(i)))
                }
            }
        }
        button #gear-toggle .btn.btn-out style="margin-top:24px;color:var(--brown);border-color:var(--brown)" onclick="toggleGear()" {
            "see the full rig →"
        }
    }
}

// ============================================================================
// Music
// ============================================================================

fn embed_album(album: &EmbedAlbum, stagger: Option<usize>) -> Markup {
    html! {
        div.alb.alb-bc.rv data-d=[stagger] style="grid-column:span 2" {
            iframe style="border:0;width:100%;height:274px" src=(bandcamp_player_url(&album.album_id)) seamless {}
            div.alb-buy {
                a.btn.btn-red href=(album.url) target="_blank" style="font-size:.58rem;padding:10px 22px" {
                    "buy on bandcamp"
                }
            }
        }
    }
}

fn flip_card(card: &FlipCard, stagger: Option<usize>) -> Markup {
    let background = gradient(&card.colors);
    html! {
        div.alb.alb-flip.rv data-d=[stagger] onclick="this.classList.toggle('flipped')" {
            div.alb-flip-inner {
                div.alb-front {
                    div.alb-art style=(background) {
                        span { (card.num) }
                        @if let Some(badge) = &card.badge {
                            div.alb-badge { (badge) }
                        }
                    }
                    div.alb-info {
                        h3 { (card.title) }
                        p { (card.year) }
                    }
                }
                div.alb-back style=(background) {
                    div.alb-back-title { (card.title) }
                    ol.alb-tracklist {
                        @for track in &card.tracks {
                            li { (track) }
                        }
                    }
                    div.alb-back-hint { "tap to flip back" }
                }
            }
        }
    }
}

/// Album grid. Embeds get the Bandcamp player, everything else a flip card.
pub fn albums(albums: &[Album]) -> Markup {
    html! {
        div.albums {
            @for (i, album) in albums.iter().enumerate() {
                @match album {
                    Album::Embed(embed) => { (embed_album(embed, stagger(i))) }
                    Album::FlipCard(card) => { (flip_card(card, stagger(i))) }
                }
            }
        }
    }
}

pub fn streaming_links(links: &LinkList) -> Markup {
    html! {
        div.stream-links.rv {
            @for (label, url) in links.iter() {
                a href=(url) target="_blank" { (label) }
            }
        }
    }
}

/// Scrolling skull banner; the image run is repeated so the loop is seamless.
pub fn banner(images: &[String], policy: &ImagePolicy) -> Markup {
    let sources: Vec<String> = images.iter().map(|f| policy.resolve(f)).collect();
    html! {
        @if !sources.is_empty() {
            div.skull-banner {
                div.skull-banner-inner {
                    @for _ in 0..2 {
                        @for src in &sources {
                            img src=(src) alt="";
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Studio & teaching
// ============================================================================

pub fn services(services: &[Service]) -> Markup {
    html! {
        div.svc-grid {
            @for (i, service) in services.iter().enumerate() {
                div.svc.rv-rot data-d=[stagger(i)] {
                    div.svc-num { (service.num) }
                    h3 { (service.title) }
                    p { (service.desc) }
                    div.svc-hover-line {}
                }
            }
        }
    }
}

pub fn classes(classes: &[Class]) -> Markup {
    html! {
        div.classes {
            @for (i, class) in classes.iter().enumerate() {
                div.cls.rv data-d=[stagger(i)] {
                    span.cls-tag { (class.tag) }
                    h3 { (class.title) }
                    p { (class.desc) }
                    div.cls-foot {
                        span { (class.foot_1) }
                        span { (class.foot_2) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Social proof & media
// ============================================================================

pub fn testimonials(items: &[Testimonial], policy: &ImagePolicy) -> Markup {
    html! {
        div.test-grid {
            @for (i, item) in items.iter().enumerate() {
                @let src = item.image.as_deref().map(|f| policy.resolve(f)).unwrap_or_default();
                div.test-card.rv data-d=[stagger(i)] {
                    div.test-quote { (PreEscaped("&ldquo;")) (item.quote) (PreEscaped("&rdquo;")) }
                    div.test-author {
                        @if src.is_empty() {
                            div.test-avatar.test-avatar-placeholder {
                                span { (item.initial()) }
                            }
                        } @else {
                            div.test-avatar {
                                img src=(src) alt=(item.name);
                            }
                        }
                        div {
                            strong { (item.name) }
                            span { (item.role) }
                        }
                    }
                }
            }
        }
    }
}

pub fn videos(items: &[Video]) -> Markup {
    html! {
        div.vid-grid {
            @for (i, video) in items.iter().enumerate() {
                div.vid-card.rv data-d=[stagger(i)] {
                    @if let Some(id) = video.embed_id() {
                        div.vid-embed {
                            iframe src={ "https://www.youtube.com/embed/" (id) } frameborder="0"
                                allow="accelerometer;autoplay;clipboard-write;encrypted-media;gyroscope;picture-in-picture"
                                allowfullscreen {}
                        }
                    } @else {
                        div.vid-placeholder {
                            div.vid-play-icon { "▶" }
                            span { "video coming soon" }
                        }
                    }
                    div.vid-info {
                        h4 { (video.title) }
                        p { (video.desc) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Strips, events, contact
// ============================================================================

/// One pass of marquee items, each followed by `separator` (an HTML entity).
pub fn marquee_run(items: &[String], separator: &'static str) -> Markup {
    html! {
        @for item in items {
            span.t1 { (item) }
            span.t2 { (PreEscaped(separator)) }
            " "
        }
    }
}

pub fn event_placeholders(items: &[EventPlaceholder]) -> Markup {
    html! {
        @for (i, event) in items.iter().enumerate() {
            div.ev-item.rv data-d=[stagger(i)] {
                span.ev-date { (event.date) }
                div.ev-info {
                    h4 { (event.title) }
                    @if !event.detail.is_empty() {
                        p { (event.detail) }
                    }
                }
            }
        }
    }
}

pub fn socials(links: &LinkList) -> Markup {
    html! {
        div.socials style="margin-top:20px" {
            @for (label, url) in links.iter() {
                a href=(url) target="_blank" { (label) }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
