//! Real browser tests. These need a Chrome/Chromium install and are marked #[ignore].
//! Run with: cargo test -p screengrab-capture --test chrome_session -- --ignored

use screengrab_capture::config::BrowserSettings;
use screengrab_capture::output::{save_screenshot, OutputFormat};
use screengrab_capture::{BrowserSession, ChromeSession, Viewport};
use std::time::Duration;

const PAGE: &str = "data:text/html,<body style='background:rgb(0,128,255)'>screengrab</body>";

#[test]
#[ignore = "requires a local Chrome/Chromium"]
fn capture_returns_png() {
    let mut session = ChromeSession::launch(
        PAGE,
        Viewport::new(800, 480),
        &BrowserSettings::default(),
        Duration::from_secs(60),
    )
    .expect("launch");

    let png = session.capture().expect("capture");
    assert_eq!(
        image::guess_format(&png).expect("guess"),
        image::ImageFormat::Png
    );

    let tmp = tempfile::tempdir().expect("tempdir");
    let path = save_screenshot(&png, tmp.path(), OutputFormat::Bmp).expect("save");
    assert!(path.exists());

    session.close().expect("close");
}

#[test]
#[ignore = "requires a local Chrome/Chromium"]
fn capture_after_close_fails() {
    let mut session = ChromeSession::launch(
        PAGE,
        Viewport::default(),
        &BrowserSettings::default(),
        Duration::from_secs(60),
    )
    .expect("launch");

    session.close().expect("close");
    session.close().expect("second close");
    assert!(session.capture().is_err());
}
