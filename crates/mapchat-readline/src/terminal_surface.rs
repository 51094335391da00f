//! A map surface that narrates overlay operations to the terminal.

use async_trait::async_trait;
use colored::Colorize;
use mapchat_core::{LatLng, MapSurface, OverlayHandle, SurfaceError};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct TerminalSurface {
    next_handle: AtomicU64,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> OverlayHandle {
        OverlayHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn coords(position: LatLng) -> String {
    format!("({:.4}, {:.4})", position.lat, position.lon)
}

/// Recovers the marker name from its `<b>`-wrapped, HTML-escaped popup.
fn plain_label(popup_html: &str) -> String {
    popup_html
        .trim_start_matches("<b>")
        .trim_end_matches("</b>")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[async_trait]
impl MapSurface for TerminalSurface {
    async fn set_view(&self, center: LatLng, zoom: u8, _animate: bool) -> Result<(), SurfaceError> {
        println!(
            "{}",
            format!("  [map] view {} zoom {}", coords(center), zoom).bright_black()
        );
        Ok(())
    }

    async fn mount_marker(
        &self,
        position: LatLng,
        popup_html: &str,
    ) -> Result<OverlayHandle, SurfaceError> {
        let handle = self.allocate();
        let label = plain_label(popup_html);
        println!(
            "{}",
            format!("  [map] + {} {}", label, coords(position)).bright_cyan()
        );
        Ok(handle)
    }

    async fn mount_pulse(&self, _position: LatLng) -> Result<OverlayHandle, SurfaceError> {
        Ok(self.allocate())
    }

    async fn unmount(&self, handle: OverlayHandle) -> Result<(), SurfaceError> {
        tracing::trace!("[TerminalSurface] unmount {}", handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapchat_core::markup::popup_html;

    #[test]
    fn test_plain_label_unescapes_name() {
        assert_eq!(plain_label(&popup_html("Cafe A")), "Cafe A");
        assert_eq!(plain_label(&popup_html("A&B")), "A&B");
        assert_eq!(plain_label(&popup_html("<\"x\">")), "<\"x\">");
        assert_eq!(plain_label(&popup_html("&lt;")), "&lt;");
    }
}
