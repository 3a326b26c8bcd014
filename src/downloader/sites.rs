// Site capability registry
//
// Static table describing which platforms we recognize and which filter
// controls are meaningful for each. Loaded once, immutable. This is about
// WHAT filters are legal for a site; the engine router decides HOW the site
// gets fetched.

use serde::Serialize;

/// Capabilities of one recognized platform.
#[derive(Debug, Clone, Serialize)]
pub struct SiteCapability {
    /// Stable identifier
    pub key: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    /// Substrings that identify the platform in a host or URL
    pub domain_aliases: &'static [&'static str],
    /// First entry is the default
    pub content_types: &'static [&'static str],
    pub quality_options: &'static [&'static str],
    pub supports_bulk: bool,
    pub supports_date_filter: bool,
    pub supports_playlists: bool,
    pub supports_channels: bool,
}

impl SiteCapability {
    pub fn default_content_type(&self) -> &'static str {
        self.content_types[0]
    }

    pub fn is_generic(&self) -> bool {
        self.key == GENERIC.key
    }
}

static SITES: &[SiteCapability] = &[
    SiteCapability {
        key: "youtube",
        display_name: "YouTube",
        icon: "🎥",
        domain_aliases: &["youtube.com", "youtu.be"],
        content_types: &["All Videos", "Shorts Only", "Audio Only"],
        quality_options: &[
            "Best Available",
            "4K",
            "1440p",
            "1080p",
            "720p",
            "480p",
            "Audio Only",
        ],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: true,
        supports_channels: true,
    },
    SiteCapability {
        key: "tiktok",
        display_name: "TikTok",
        icon: "🎵",
        domain_aliases: &["tiktok.com", "vm.tiktok.com"],
        content_types: &["All Videos", "Audio Only"],
        quality_options: &["Best Available", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
    SiteCapability {
        key: "instagram",
        display_name: "Instagram",
        icon: "📸",
        domain_aliases: &["instagram.com", "instagr.am"],
        content_types: &["All Videos", "Reels Only", "Stories Only", "Audio Only"],
        quality_options: &["Best Available", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
    SiteCapability {
        key: "twitter",
        display_name: "Twitter/X",
        icon: "🐦",
        domain_aliases: &["twitter.com", "x.com", "t.co"],
        content_types: &["All Videos", "Audio Only"],
        quality_options: &["Best Available", "1080p", "720p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
    SiteCapability {
        key: "facebook",
        display_name: "Facebook",
        icon: "👥",
        domain_aliases: &["facebook.com", "fb.com", "fb.watch"],
        content_types: &["All Videos", "Reels Only", "Stories Only", "Audio Only"],
        quality_options: &["Best Available", "1080p", "720p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
    SiteCapability {
        key: "vimeo",
        display_name: "Vimeo",
        icon: "🎬",
        domain_aliases: &["vimeo.com"],
        content_types: &["All Videos", "Audio Only"],
        quality_options: &["Best Available", "4K", "1080p", "720p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: true,
        supports_channels: true,
    },
    SiteCapability {
        key: "dailymotion",
        display_name: "Dailymotion",
        icon: "📹",
        domain_aliases: &["dailymotion.com", "dai.ly"],
        content_types: &["All Videos", "Audio Only"],
        quality_options: &["Best Available", "1080p", "720p", "480p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: true,
        supports_channels: true,
    },
    SiteCapability {
        key: "twitch",
        display_name: "Twitch",
        icon: "🎮",
        domain_aliases: &["twitch.tv"],
        content_types: &["All Videos", "Clips Only", "Audio Only"],
        quality_options: &["Best Available", "1080p", "720p", "480p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
    SiteCapability {
        key: "reddit",
        display_name: "Reddit",
        icon: "🤖",
        domain_aliases: &["reddit.com", "redd.it", "v.redd.it"],
        content_types: &["All Videos", "Audio Only"],
        quality_options: &["Best Available", "720p", "480p", "Audio Only"],
        supports_bulk: true,
        supports_date_filter: true,
        supports_playlists: false,
        supports_channels: true,
    },
];

/// Catch-all for unrecognized hosts: single items only, no date filtering.
static GENERIC: SiteCapability = SiteCapability {
    key: "generic",
    display_name: "Generic Site",
    icon: "🌐",
    domain_aliases: &[],
    content_types: &["All Videos", "Audio Only"],
    quality_options: &["Best Available", "Audio Only"],
    supports_bulk: false,
    supports_date_filter: false,
    supports_playlists: false,
    supports_channels: false,
};

/// URL shapes that matter for routing bulk work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Single,
    Playlist,
    Channel,
    Album,
}

/// Resolve a URL to exactly one platform entry, falling back to the generic
/// catch-all. An alias matches when it appears in the URL's host or anywhere
/// in the lowercased URL (covers shortened domains like `youtu.be`).
pub fn detect(url: &str) -> &'static SiteCapability {
    if url.trim().is_empty() {
        return &GENERIC;
    }

    let url_lower = url.to_lowercase();
    let host = host_of(&url_lower);

    for site in SITES {
        for alias in site.domain_aliases {
            if host.contains(alias) || url_lower.contains(alias) {
                return site;
            }
        }
    }

    &GENERIC
}

pub fn generic() -> &'static SiteCapability {
    &GENERIC
}

/// Whether a URL targets a channel, playlist or collection rather than a
/// single item. Used to decide whether anti-rate-limit pacing applies.
pub fn is_bulk_url(url: &str) -> bool {
    const BULK_MARKERS: &[&str] = &[
        "playlist",
        "channel",
        "/c/",
        "/@",
        "/user/",
        "albums",
        "sets",
        "collections",
    ];
    let url_lower = url.to_lowercase();
    BULK_MARKERS.iter().any(|marker| url_lower.contains(marker))
}

/// Coarse classification of what the URL points at.
pub fn url_kind(url: &str) -> UrlKind {
    let url_lower = url.to_lowercase();
    if url_lower.contains("playlist") || url_lower.contains("list=") {
        UrlKind::Playlist
    } else if ["channel", "/c/", "/@", "/user/"]
        .iter()
        .any(|marker| url_lower.contains(marker))
    {
        UrlKind::Channel
    } else if url_lower.contains("album") {
        UrlKind::Album
    } else {
        UrlKind::Single
    }
}

// Host part of an already-lowercased URL, without the "www." prefix.
fn host_of(url_lower: &str) -> &str {
    let after_scheme = match url_lower.find("://") {
        Some(pos) => &url_lower[pos + 3..],
        None => url_lower,
    };
    let host = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_has_content_and_quality_options() {
        for site in SITES.iter().chain(std::iter::once(&GENERIC)) {
            assert!(
                !site.content_types.is_empty(),
                "{} has no content types",
                site.key
            );
            assert!(
                !site.quality_options.is_empty(),
                "{} has no quality options",
                site.key
            );
        }
    }

    #[test]
    fn detects_platforms_by_alias() {
        assert_eq!(detect("https://www.youtube.com/watch?v=abc").key, "youtube");
        assert_eq!(detect("https://youtu.be/abc").key, "youtube");
        assert_eq!(detect("https://vm.tiktok.com/ZMabc/").key, "tiktok");
        assert_eq!(detect("https://www.instagram.com/reel/xyz/").key, "instagram");
        assert_eq!(detect("https://x.com/user/status/123").key, "twitter");
        assert_eq!(detect("https://fb.watch/abc/").key, "facebook");
    }

    #[test]
    fn unknown_hosts_resolve_to_generic() {
        let site = detect("https://example.org/some/file.mp4");
        assert!(site.is_generic());
        assert!(!site.supports_bulk);
        assert!(!site.supports_date_filter);
        assert!(!site.supports_playlists);
        assert!(!site.supports_channels);
        assert_eq!(site.content_types, &["All Videos", "Audio Only"]);
    }

    #[test]
    fn empty_url_resolves_to_generic() {
        assert!(detect("").is_generic());
    }

    #[test]
    fn default_content_type_is_first_entry() {
        assert_eq!(
            detect("https://youtube.com/watch?v=1").default_content_type(),
            "All Videos"
        );
    }

    #[test]
    fn bulk_urls_are_flagged() {
        assert!(is_bulk_url("https://www.youtube.com/@SomeChannel/videos"));
        assert!(is_bulk_url("https://youtube.com/playlist?list=PL123"));
        assert!(is_bulk_url("https://soundcloud.com/artist/sets/mix"));
        assert!(is_bulk_url("https://flickr.com/photos/user/albums"));
        assert!(!is_bulk_url("https://youtube.com/watch?v=abc"));
        assert!(!is_bulk_url("https://example.org/file.mp4"));
    }

    #[test]
    fn url_kind_classification() {
        assert_eq!(
            url_kind("https://youtube.com/playlist?list=PL1"),
            UrlKind::Playlist
        );
        assert_eq!(url_kind("https://youtube.com/watch?v=1&list=PL1"), UrlKind::Playlist);
        assert_eq!(url_kind("https://youtube.com/@Handle"), UrlKind::Channel);
        assert_eq!(url_kind("https://site.com/album/42"), UrlKind::Album);
        assert_eq!(url_kind("https://youtube.com/watch?v=1"), UrlKind::Single);
    }
}
