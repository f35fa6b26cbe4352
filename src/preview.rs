//! Interactive preview seam.
//!
//! The capture loop displays the current frame, blocks for a key press, and
//! shows the segmentation overlay after an accepted capture. That interaction
//! sits behind the `Preview` trait so the loop runs the same against a real
//! window, a terminal, or a test script.
//!
//! - `WindowPreview` (feature: preview-window): OpenCV highgui windows,
//!   blocking `wait_key`.
//! - `ConsolePreview`: default build; prints a status line and reads the key
//!   from stdin.
//! - `ScriptedPreview`: replays a fixed key sequence for tests.

use anyhow::Result;
use image::RgbImage;

/// Window name for the live frame.
pub const VIDEO_WINDOW: &str = "Video";
/// Window name for the segmentation overlay.
pub const SEGMENTATION_WINDOW: &str = "segmentation";

/// Display surface plus blocking keyboard input.
pub trait Preview {
    /// Display an image under the named window.
    fn show(&mut self, window: &str, image: &RgbImage) -> Result<()>;

    /// Block until a key is pressed. `None` means input is exhausted; the
    /// capture loop treats that like any non-capture key.
    fn wait_key(&mut self) -> Result<Option<char>>;
}

// ----------------------------------------------------------------------------
// Terminal fallback
// ----------------------------------------------------------------------------

/// Line-oriented preview for builds without a display surface.
pub struct ConsolePreview {
    frames_shown: u64,
}

impl ConsolePreview {
    pub fn new() -> Self {
        Self { frames_shown: 0 }
    }
}

impl Default for ConsolePreview {
    fn default() -> Self {
        Self::new()
    }
}

impl Preview for ConsolePreview {
    fn show(&mut self, window: &str, image: &RgbImage) -> Result<()> {
        self.frames_shown += 1;
        let (w, h) = image.dimensions();
        eprintln!("[{}] frame {} ({}x{})", window, self.frames_shown, w, h);
        Ok(())
    }

    fn wait_key(&mut self) -> Result<Option<char>> {
        use std::io::BufRead;

        eprint!("press 'c' + Enter to capture, Enter to skip: ");
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.chars().next().unwrap_or('\n')))
    }
}

// ----------------------------------------------------------------------------
// OpenCV window preview
// ----------------------------------------------------------------------------

#[cfg(feature = "preview-window")]
pub use window::WindowPreview;

#[cfg(feature = "preview-window")]
mod window {
    use std::collections::HashSet;

    use anyhow::{Context, Result};
    use image::RgbImage;
    use opencv::core::Mat;
    use opencv::highgui;
    use opencv::prelude::*;

    use super::Preview;

    /// Highgui-backed preview with blocking key wait.
    pub struct WindowPreview {
        windows: HashSet<String>,
    }

    impl WindowPreview {
        pub fn new() -> Self {
            Self {
                windows: HashSet::new(),
            }
        }
    }

    impl Default for WindowPreview {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Preview for WindowPreview {
        fn show(&mut self, window: &str, image: &RgbImage) -> Result<()> {
            if self.windows.insert(window.to_string()) {
                highgui::named_window(window, highgui::WINDOW_AUTOSIZE)
                    .with_context(|| format!("create window {}", window))?;
            }

            // highgui expects BGR byte order
            let (width, height) = image.dimensions();
            let mut bgr = Vec::with_capacity((width * height * 3) as usize);
            for pixel in image.pixels() {
                bgr.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
            }

            let flat = Mat::from_slice(&bgr).context("wrap frame bytes")?;
            let mat = flat
                .reshape(3, height as i32)
                .context("reshape frame matrix")?;
            highgui::imshow(window, &mat).with_context(|| format!("show window {}", window))?;
            Ok(())
        }

        fn wait_key(&mut self) -> Result<Option<char>> {
            let code = highgui::wait_key(0).context("wait for key press")?;
            if code < 0 {
                return Ok(None);
            }
            Ok(Some((code & 0xff) as u8 as char))
        }
    }
}

// ----------------------------------------------------------------------------
// Scripted preview for tests
// ----------------------------------------------------------------------------

/// Preview that records shows and replays a fixed key sequence.
pub struct ScriptedPreview {
    keys: std::collections::VecDeque<char>,
    shown: Vec<(String, (u32, u32))>,
}

impl ScriptedPreview {
    pub fn with_keys<I: IntoIterator<Item = char>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            shown: Vec::new(),
        }
    }

    /// Window names and dimensions shown so far, in order.
    pub fn shown(&self) -> &[(String, (u32, u32))] {
        &self.shown
    }
}

impl Preview for ScriptedPreview {
    fn show(&mut self, window: &str, image: &RgbImage) -> Result<()> {
        self.shown.push((window.to_string(), image.dimensions()));
        Ok(())
    }

    fn wait_key(&mut self) -> Result<Option<char>> {
        Ok(self.keys.pop_front())
    }
}
