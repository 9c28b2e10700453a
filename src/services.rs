//! Opaque service collaborators: image generation and vision inference.
//!
//! Both are consumed through traits so the pipeline composes over them; the concrete
//! clients speak blocking HTTP and are constructed with injected endpoints and keys.
//! Credentials never live in code.

pub mod gemini;
pub mod openai;

use std::{path::Path, sync::LazyLock, thread, time::Duration};

use anyhow::Context as _;
use regex::Regex;
use tracing::warn;

use crate::error::{SpritemillError, SpritemillResult};

/// Prompt-to-image service: returns a URL for one generated image.
pub trait ImageGenerator {
    fn generate(&self, prompt: &str, size: &str, quality: &str) -> SpritemillResult<String>;
}

/// Image-question service: returns free text describing the image.
pub trait VisionModel {
    fn describe(&self, prompt: &str, image_path: &Path) -> SpritemillResult<String>;
}

/// Retry `op` up to `max_tries` times with a fixed sleep between attempts.
///
/// Bounded and sequential, with no backoff or jitter. The last error is surfaced when
/// every attempt fails.
pub fn with_retries<T>(
    what: &str,
    max_tries: u32,
    delay: Duration,
    mut op: impl FnMut() -> SpritemillResult<T>,
) -> SpritemillResult<T> {
    let max_tries = max_tries.max(1);
    let mut last_err = None;
    for attempt in 1..=max_tries {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("{what} attempt {attempt}/{max_tries} failed: {err}");
                last_err = Some(err);
                if attempt < max_tries {
                    thread::sleep(delay);
                }
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| SpritemillError::external(format!("{what}: no attempts were made"))))
}

static INTEGERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("hard-coded regex"));

/// Parse a vision reply into a `(rows, cols)` grid hint.
///
/// The first two integers anywhere in the text win, in order. No integers at all
/// yields the documented `(0, 0)` degraded-result sentinel (not an error), and a
/// single integer yields `(n, 0)`. Downstream slicing rejects zero dimensions.
pub fn parse_grid_hint(text: &str) -> (u32, u32) {
    let mut found = INTEGERS
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok());
    let rows = found.next().unwrap_or(0);
    let cols = found.next().unwrap_or(0);
    (rows, cols)
}

/// Download a generated image to `dest`, failing on any non-2xx response.
pub fn download_image(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> SpritemillResult<()> {
    crate::media::ensure_parent_dir(dest)?;

    let res = client
        .get(url)
        .send()
        .map_err(|e| SpritemillError::external(format!("image download request failed: {e}")))?;
    if !res.status().is_success() {
        return Err(SpritemillError::ImageDownload {
            url: url.to_string(),
            status: res.status().as_u16(),
        });
    }

    let bytes = res
        .bytes()
        .map_err(|e| SpritemillError::external(format!("failed to read image bytes: {e}")))?;
    std::fs::write(dest, &bytes)
        .with_context(|| format!("write downloaded image '{}'", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_hint_takes_first_two_integers() {
        assert_eq!(parse_grid_hint("[4] [4]"), (4, 4));
        assert_eq!(parse_grid_hint("There are 3 rows and 5 columns."), (3, 5));
        assert_eq!(parse_grid_hint("rows=2 cols=8 extra=9"), (2, 8));
    }

    #[test]
    fn grid_hint_without_integers_is_the_zero_sentinel() {
        assert_eq!(parse_grid_hint("I cannot tell."), (0, 0));
        assert_eq!(parse_grid_hint(""), (0, 0));
    }

    #[test]
    fn grid_hint_with_one_integer_leaves_cols_zero() {
        assert_eq!(parse_grid_hint("maybe 4?"), (4, 0));
    }

    #[test]
    fn retries_stop_after_first_success() {
        let mut calls = 0;
        let out = with_retries("test op", 5, Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(SpritemillError::external("transient"))
            } else {
                Ok(calls)
            }
        })
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn retries_surface_the_last_error() {
        let mut calls = 0;
        let err = with_retries("test op", 3, Duration::ZERO, || -> SpritemillResult<()> {
            calls += 1;
            Err(SpritemillError::external(format!("failure {calls}")))
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(err.to_string().contains("failure 3"));
    }

    #[test]
    fn zero_max_tries_still_attempts_once() {
        let mut calls = 0;
        let _ = with_retries("test op", 0, Duration::ZERO, || {
            calls += 1;
            Ok(())
        });
        assert_eq!(calls, 1);
    }
}
