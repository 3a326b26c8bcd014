// Engine router
//
// Two-list-then-default classifier: known video platforms go to the
// video-extractor engine, known file hosts go to the file-host manager,
// everything else falls through to browser automation. Both lists are
// static data, deliberately independent of the site capability registry.

use super::models::EngineChoice;

/// Platforms the video-extraction tool handles natively.
pub const VIDEO_PLATFORMS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "vimeo.com",
    "twitch.tv",
    "facebook.com",
    "fb.watch",
    "reddit.com",
    "dailymotion.com",
];

/// One-click file hosting services handled by the download manager.
pub const FILE_HOSTS: &[&str] = &[
    "mega.nz",
    "mega.co.nz",
    "mediafire.com",
    "rapidgator.net",
    "1fichier.com",
    "uploaded.net",
    "turbobit.net",
    "nitroflare.com",
    "zippyshare.com",
    "sendspace.com",
    "depositfiles.com",
];

/// Pick the engine family for a URL. Never fails; unknown sites get the
/// browser-automation fallback.
pub fn choose_engine(url: &str) -> EngineChoice {
    let url_lower = url.to_lowercase();

    if VIDEO_PLATFORMS
        .iter()
        .any(|platform| url_lower.contains(platform))
    {
        return EngineChoice::VideoExtractor;
    }

    if FILE_HOSTS.iter().any(|host| url_lower.contains(host)) {
        return EngineChoice::FileHostManager;
    }

    EngineChoice::BrowserAutomation
}
