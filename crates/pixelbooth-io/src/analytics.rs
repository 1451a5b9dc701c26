//! Lightweight Simple Analytics event tracking.
//!
//! Calls the global `sa_event` function injected by the Simple
//! Analytics `<script>` tag. Tracking silently no-ops when the script
//! is absent (e.g., blocked by an ad-blocker).

use pixelbooth_core::{BoothVariant, ConversionStage};
use wasm_bindgen::prelude::*;

/// Something worth counting in the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothEvent {
    /// A photo was uploaded from disk.
    Upload,
    /// A photo was taken with the webcam.
    Capture,
    /// A portrait finished converting.
    Complete(BoothVariant),
    /// A remote step failed.
    Failed(ConversionStage),
    /// The finished portrait was saved.
    Download,
}

impl BoothEvent {
    /// Event name in Simple Analytics form: lowercase alphanumeric with
    /// underscores.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Upload => "booth_upload".to_owned(),
            Self::Capture => "booth_capture".to_owned(),
            Self::Complete(variant) => format!("booth_complete_{}", variant.name()),
            Self::Failed(stage) => format!("booth_failed_{}", stage.name()),
            Self::Download => "booth_download".to_owned(),
        }
    }
}

/// Fire a Simple Analytics custom event for `event`.
pub fn track(event: BoothEvent) {
    let name = event.name();
    debug_assert!(
        name.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'),
        "event name must be lowercase alphanumeric or underscore, got: {name:?}"
    );

    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(func) = js_sys::Reflect::get(&window, &JsValue::from_str("sa_event")) else {
        return;
    };
    if !func.is_function() {
        return;
    }
    let func: js_sys::Function = func.unchecked_into();
    let _ = func.call1(&JsValue::NULL, &JsValue::from_str(&name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_valid_event_names() {
        let events = [
            BoothEvent::Upload,
            BoothEvent::Capture,
            BoothEvent::Complete(BoothVariant::Passport),
            BoothEvent::Complete(BoothVariant::Sing),
            BoothEvent::Failed(ConversionStage::Detect),
            BoothEvent::Failed(ConversionStage::Convert),
            BoothEvent::Download,
        ];
        for event in events {
            let name = event.name();
            assert!(
                name.bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'),
                "{name}"
            );
        }
        assert_eq!(
            BoothEvent::Failed(ConversionStage::Convert).name(),
            "booth_failed_convert"
        );
    }
}
