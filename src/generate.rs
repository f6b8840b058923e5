//! Page generation.
//!
//! Loads the content document, renders every section in a fixed order into a
//! single HTML document, and writes it to the output path. Rendering happens
//! fully in memory first; the output file is only touched once the whole page
//! rendered, so a content error never leaves a half-written page behind.
//!
//! ## Section Order
//!
//! ```text
//! nav → hero → marquee → music → studio → photo break → gear → videos
//!     → testimonials → teaching → genre marquee → events → contact → footer
//!     → behavior script
//! ```
//!
//! ## Behavior Script
//!
//! `static/site.js` is embedded at compile time. The calendar id and API key
//! from the content document are emitted as JS string constants right before
//! it; the script uses them to fetch upcoming shows in the browser.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every interpolated field is HTML-escaped.

use crate::assets::{ImageMode, ImagePolicy, ImageWarning};
use crate::content::{
    Calendar, Contact, Content, ContentError, Events, Gear, Hero, Marquee, Music, PhotoBreak,
    Site, Studio, Teaching, Testimonials, Videos, load_content,
};
use crate::sections;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Content(#[from] ContentError),
}

const JS: &str = include_str!("../static/site.js");

const NAV_LINKS: &[(&str, &str)] = &[
    ("#music", "Music"),
    ("#studio", "Studio"),
    ("#gear", "Gear"),
    ("#videos", "Watch"),
    ("#teaching", "Teaching"),
    ("#events", "Events"),
    ("#contact", "Contact"),
];

/// Inputs for a page build, already resolved against the project root.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content_path: PathBuf,
    pub images_dir: PathBuf,
    pub output_path: PathBuf,
    pub mode: ImageMode,
    pub link_prefix: String,
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub bytes: u64,
    pub mode: ImageMode,
    pub warnings: Vec<ImageWarning>,
}

/// Load the content document, render the page, and write it.
pub fn build(options: &BuildOptions) -> Result<BuildReport, GenerateError> {
    let content = load_content(&options.content_path)?;
    let policy = ImagePolicy::new(options.mode, &options.images_dir, &options.link_prefix);

    let page = render_site(&content, &policy).into_string();
    debug!("rendered page: {} bytes", page.len());

    write_page(&options.output_path, &page)?;

    Ok(BuildReport {
        output_path: options.output_path.clone(),
        bytes: page.len() as u64,
        mode: options.mode,
        warnings: policy.take_warnings(),
    })
}

/// Write through a temp file in the target directory, renamed over `path`
/// once complete.
fn write_page(path: &Path, page: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(page.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path)?;
    Ok(())
}

/// Render the complete page for a content document.
pub fn render_site(content: &Content, policy: &ImagePolicy) -> Markup {
    let body = html! {
        div.cursor-glow #cursorGlow {}
        (site_nav(&content.site))
        (hero(&content.hero, &content.site, policy))
        (marquee_strip(&content.marquee, "&bull;", false))
        (music(&content.music, policy))
        (studio(&content.studio, policy))
        (photo_break(&content.photo_break, policy))
        (gear(&content.gear, policy))
        (videos(&content.videos))
        (testimonials(&content.testimonials, policy))
        (teaching(&content.teaching, &content.site, policy))
        (marquee_strip(&content.genre_marquee, "&diams;", true))
        (events(&content.events, policy))
        (contact(&content.contact))
        (footer(&content.site, &content.contact))
        (behavior_script(&content.calendar))
    };
    base_document(&content.site, body)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(site: &Site, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width,initial-scale=1.0";
                title { (site.title) }
                @if let Some(fonts) = &site.fonts_url {
                    link rel="preconnect" href="https://fonts.googleapis.com";
                    link rel="preconnect" href="https://fonts.gstatic.com" crossorigin;
                    link href=(fonts) rel="stylesheet";
                }
                link rel="stylesheet" href=(site.stylesheet);
            }
            body {
                (body)
            }
        }
    }
}

fn site_nav(site: &Site) -> Markup {
    html! {
        nav #nb {
            a.nav-logo href="#" { (site.nav_logo) }
            ul.nav-links #nl {
                @for (href, label) in NAV_LINKS {
                    li { a href=(href) onclick="cm()" { (label) } }
                }
            }
            button.menu-btn #mb aria-label="Menu" {
                span {}
                span {}
                span {}
            }
        }
    }
}

/// Section label and split-animated title shared by every section.
fn section_heading(label: &str, title: &str, reveal: &str) -> Markup {
    html! {
        p class={ "s-label " (reveal) } { (label) }
        h2.s-title data-split { (title) }
    }
}

fn hero(hero: &Hero, site: &Site, policy: &ImagePolicy) -> Markup {
    let video_id = hero.video_youtube_id.as_deref().filter(|id| !id.is_empty());
    html! {
        section.hero {
            @if let Some(id) = video_id {
                div.hero-video-wrap {
                    iframe src=(hero_video_url(id)) allow="autoplay" loading="lazy" {}
                    div.hero-video-overlay {}
                }
            }
            div.deco.deco-ring style="top:15%;left:8%;opacity:.06" {}
            div.deco.deco-cross style="bottom:20%;right:12%;opacity:.08;transform:rotate(15deg)" {}
            div.hero-grid {
                div.hero-text {
                    p.hero-tag { (hero.tagline) }
                    h1 {
                        span.word { (hero.name_line1) }
                        " "
                        span.word { (hero.name_line2) }
                        " "
                        span.word { (hero.name_line3) }
                    }
                    p.hero-sub { (hero.subtitle) }
                    div.hero-btns {
                        a.btn.btn-red href="#music" { (hero.btn_primary) }
                        a.btn.btn-out href="#contact" { (hero.btn_secondary) }
                    }
                }
                div.hero-images {
                    div.hero-stamp-2 { (hero.stamp_2) }
                    div.hero-img-main { img src=(policy.resolve(&hero.image_main)) alt=(site.owner_name()); }
                    div.hero-img-accent { img src=(policy.resolve(&hero.image_accent)) alt="Playing guitar"; }
                    div.hero-stamp { (hero.stamp_1) }
                }
            }
            div.scroll-hint {
                span { "scroll" }
                div.scroll-arrow {}
            }
        }
    }
}

fn hero_video_url(id: &str) -> String {
    format!(
        "https://www.youtube.com/embed/{id}?autoplay=1&mute=1&loop=1&playlist={id}&controls=0&showinfo=0&rel=0&modestbranding=1&playsinline=1&enablejsapi=1"
    )
}

/// Scrolling text strip. The run is emitted twice so the CSS loop is seamless.
fn marquee_strip(marquee: &Marquee, separator: &'static str, reversed: bool) -> Markup {
    let run = sections::marquee_run(&marquee.items, separator);
    html! {
        div.marquee style=[reversed.then_some("background:var(--wine)")] {
            div.marquee-inner style=[reversed.then_some("animation-direction:reverse")] {
                (run)
                (run)
            }
        }
    }
}

fn music(music: &Music, policy: &ImagePolicy) -> Markup {
    let album_link = music.streaming_links.get("bandcamp").unwrap_or("#");
    html! {
        section #music {
            (sections::banner(&music.banner_images, policy))
            div.deco.deco-dot style="top:60px;right:80px;opacity:.2" {}
            div.deco.deco-line style="bottom:100px;left:40px;opacity:.1;transform:rotate(-20deg)" {}
            div.wrap {
                (section_heading(&music.label, &music.title, "rv"))
                p.s-sub.rv style="color:var(--lav)" { (music.subtitle) }
                div.music-layout {
                    div.music-visual.rv-s {
                        div.music-badge { (music.badge) }
                        div.music-img-1 { img src=(policy.resolve(&music.image_1)) alt="Live performance"; }
                        div.music-img-2 { img src=(policy.resolve(&music.image_2)) alt="Performing"; }
                    }
                    div {
                        (sections::albums(&music.albums))
                        (sections::streaming_links(&music.streaming_links))
                        div.section-cta.rv data-d="3" {
                            a.btn-cta.btn-cta-coral href=(album_link) target="_blank" { "get the album" }
                        }
                    }
                }
            }
        }
    }
}

fn studio(studio: &Studio, policy: &ImagePolicy) -> Markup {
    html! {
        section #studio {
            div.deco.deco-ring style="bottom:120px;right:-40px;opacity:.05" {}
            div.wrap {
                (section_heading(&studio.label, &studio.title, "rv-l"))
                div.studio-hero {
                    div.studio-text {
                        p.s-sub.rv-l style="color:var(--faded)" { (studio.subtitle) }
                        p.studio-copy.rv { (studio.copy) }
                        div.section-cta.rv {
                            a.btn-cta.btn-cta-red href="#contact" { "book a session" }
                        }
                    }
                    div.studio-images.rv-r {
                        div.studio-img-1 { img src=(policy.resolve(&studio.image_1)) alt="Studio"; }
                        div.studio-img-2 { img src=(policy.resolve(&studio.image_2)) alt="Console"; }
                        div.studio-stamp { (studio.stamp) }
                    }
                }
                (sections::services(&studio.services))
                div.quote-bar.rv-s {
                    blockquote { (PreEscaped("&ldquo;")) (studio.quote) (PreEscaped("&rdquo;")) }
                    cite { (PreEscaped("&mdash; ")) (studio.quote_author) }
                }
            }
        }
    }
}

fn photo_break(photo: &PhotoBreak, policy: &ImagePolicy) -> Markup {
    html! {
        div.photo-break {
            img src=(policy.resolve(&photo.image)) alt="Studio moments";
            div.photo-break-stamp { (photo.stamp) }
        }
    }
}

fn gear(gear: &Gear, policy: &ImagePolicy) -> Markup {
    html! {
        section #gear {
            div.deco.deco-cross style="top:80px;left:60px;opacity:.08;transform:rotate(22deg)" {}
            div.wrap {
                (section_heading(&gear.label, &gear.title, "rv"))
                div.gear-story {
                    div.gear-story-img.rv-l { img src=(policy.resolve(&gear.story_image)) alt="Console"; }
                    div.gear-story-text.rv-r { (gear.story_text) }
                }
                (sections::gear(&gear.categories))
            }
        }
    }
}

fn videos(videos: &Videos) -> Markup {
    html! {
        section #videos {
            div.deco.deco-dot style="top:80px;right:60px;opacity:.15" {}
            div.wrap {
                (section_heading(&videos.label, &videos.title, "rv"))
                p.s-sub.rv style="color:var(--lav)" { (videos.subtitle) }
                (sections::videos(&videos.items))
            }
        }
    }
}

fn testimonials(testimonials: &Testimonials, policy: &ImagePolicy) -> Markup {
    html! {
        section #testimonials {
            div.deco.deco-ring style="top:60px;right:80px;opacity:.06" {}
            div.wrap {
                (section_heading(&testimonials.label, &testimonials.title, "rv"))
                (sections::testimonials(&testimonials.items, policy))
            }
        }
    }
}

fn teaching(teaching: &Teaching, site: &Site, policy: &ImagePolicy) -> Markup {
    html! {
        section #teaching {
            div.deco.deco-dot style="top:100px;right:100px;opacity:.15" {}
            div.deco.deco-line style="bottom:80px;left:80px;opacity:.08;transform:rotate(35deg)" {}
            div.wrap {
                (section_heading(&teaching.label, &teaching.title, "rv-l"))
                div.teach-layout {
                    div.teach-img-stack.rv-l {
                        div.teach-stamp { (teaching.stamp) }
                        div.teach-img-1 { img src=(policy.resolve(&teaching.image_1)) alt=(site.owner_name()); }
                        div.teach-img-2 { img src=(policy.resolve(&teaching.image_2)) alt="Live performance"; }
                    }
                    div {
                        p.teach-intro.rv { (teaching.intro) }
                        (sections::classes(&teaching.classes))
                        div.section-cta.rv data-d="3" {
                            a.btn-cta.btn-cta-out href="#contact" { "enroll now" }
                        }
                    }
                }
            }
        }
    }
}

fn events(events: &Events, policy: &ImagePolicy) -> Markup {
    html! {
        section #events {
            div.wrap {
                (section_heading(&events.label, &events.title, "rv"))
                div.ev-layout {
                    div {
                        div #live-events {
                            (sections::event_placeholders(&events.placeholders))
                        }
                        p.rv data-d="3" style="margin-top:24px;font-size:.8rem;color:var(--faded)" {
                            (events.booking_text)
                            " "
                            a href="#contact" style="color:var(--red);text-decoration:none;font-weight:600" {
                                (events.booking_link_text)
                            }
                            "."
                        }
                        div.section-cta.rv data-d="4" {
                            a.btn-cta.btn-cta-dark href="#contact" { "book a show" }
                        }
                        div.ev-img.rv {
                            img src=(policy.resolve(&events.image)) alt="Band" style="object-position:center 25%";
                        }
                    }
                    div.hotties.rv-r {
                        h3 { (events.hotties_title) }
                        p { (events.hotties_desc) }
                        a href=(events.hotties_link) target="_blank" { (events.hotties_link_text) }
                    }
                }
            }
        }
    }
}

fn contact(contact: &Contact) -> Markup {
    html! {
        section #contact {
            div.deco.deco-ring style="top:80px;right:60px;opacity:.04" {}
            div.wrap {
                (section_heading(&contact.label, &contact.title, "rv-l"))
                div.ct-layout {
                    div.ct-info.rv-l {
                        h3 { (contact.heading) }
                        p { (contact.copy) }
                        p style="margin-bottom:10px" {
                            strong style="color:var(--cream)" { "Based in:" }
                            " "
                            (contact.location)
                        }
                        (sections::socials(&contact.socials))
                    }
                    form.ct-form.rv-r action={ "https://formspree.io/f/" (contact.formspree_id) } method="POST" {
                        div.f-row {
                            div.f-grp {
                                label for="name" { "name" }
                                input type="text" id="name" name="name" required;
                            }
                            div.f-grp {
                                label for="email" { "email" }
                                input type="email" id="email" name="email" required;
                            }
                        }
                        div.f-grp {
                            label for="subject" { "interested in..." }
                            select id="subject" name="subject" {
                                @for choice in &contact.inquiry_options {
                                    option value=(choice.value) { (choice.label) }
                                }
                            }
                        }
                        div.f-grp {
                            label for="message" { "message" }
                            textarea id="message" name="message" rows="4" required {}
                        }
                        button.btn-send type="submit" { "send it " (PreEscaped("&bull;")) }
                    }
                }
            }
        }
    }
}

fn footer(site: &Site, contact: &Contact) -> Markup {
    html! {
        footer {
            span.ft-name { (site.owner_name()) }
            span { (PreEscaped("&copy; ")) (site.copyright_year) }
            span {
                (contact.location.to_lowercase())
                " " (PreEscaped("&middot;")) " "
                a href="#contact" { "contact" }
            }
        }
    }
}

/// JS string literal for a value, safe inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

fn behavior_script(calendar: &Calendar) -> Markup {
    let settings = format!(
        "const GCAL_ID={};const GCAL_KEY={};const GCAL_EMPTY={};\n",
        js_string(&calendar.calendar_id),
        js_string(&calendar.api_key),
        js_string(&calendar.empty_message),
    );
    html! {
        script {
            (PreEscaped(settings))
            (PreEscaped(JS))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
