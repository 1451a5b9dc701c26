//! Button strip under the viewport.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdArrowLeft, LdCamera, LdDownload, LdSparkles};
use pixelbooth_core::{Controls, DataUrl};

use super::FileUpload;

const PRIMARY: &str = "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer";
const SECONDARY: &str = "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-secondary)] hover:bg-[var(--btn-secondary-hover)] rounded text-[var(--text)] font-medium transition-colors cursor-pointer";
const DISABLED: &str = "inline-flex items-center gap-2 px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-not-allowed";

/// Props for the [`BoothControls`] component.
#[derive(Props, Clone, PartialEq)]
pub struct BoothControlsProps {
    /// Which strip to show.
    controls: Controls,
    /// Whether the camera can take a photo right now.
    camera_ready: bool,
    /// Message shown in the failed strip.
    #[props(default)]
    error: Option<String>,
    on_capture: EventHandler<()>,
    on_upload: EventHandler<DataUrl>,
    on_confirm: EventHandler<()>,
    on_back: EventHandler<()>,
    on_save: EventHandler<()>,
}

#[component]
pub fn BoothControls(props: BoothControlsProps) -> Element {
    let back = rsx! {
        button {
            class: SECONDARY,
            onclick: move |_| props.on_back.call(()),
            Icon { width: 18, height: 18, icon: LdArrowLeft }
            "Back"
        }
    };

    match props.controls {
        Controls::Capture => rsx! {
            div { class: "flex items-start justify-center gap-3",
                FileUpload { on_upload: props.on_upload }
                button {
                    class: if props.camera_ready { PRIMARY } else { DISABLED },
                    disabled: !props.camera_ready,
                    onclick: move |_| props.on_capture.call(()),
                    Icon { width: 18, height: 18, icon: LdCamera }
                    "Take photo"
                }
            }
        },
        Controls::Confirm => rsx! {
            div { class: "flex justify-center gap-3",
                {back}
                button {
                    class: PRIMARY,
                    onclick: move |_| props.on_confirm.call(()),
                    Icon { width: 18, height: 18, icon: LdSparkles }
                    "Pixelate me"
                }
            }
        },
        Controls::Progress { percent } => rsx! {
            div { class: "w-full flex flex-col items-center gap-2",
                progress {
                    class: "w-full h-2 accent-[var(--btn-primary)]",
                    max: 100,
                    value: percent,
                }
                p { class: "text-(--text-secondary) text-sm animate-pulse",
                    if percent < 50 { "Finding your face..." } else { "Drawing pixels..." }
                }
            }
        },
        Controls::Finished => rsx! {
            div { class: "flex justify-center gap-3",
                {back}
                button {
                    class: PRIMARY,
                    onclick: move |_| props.on_save.call(()),
                    Icon { width: 18, height: 18, icon: LdDownload }
                    "Save portrait"
                }
            }
        },
        Controls::Failed => rsx! {
            div { class: "flex flex-col items-center gap-2",
                div { class: "bg-(--error-bg) border border-(--error-border) rounded p-3",
                    p { class: "text-(--text-error) text-sm",
                        {props.error.clone().unwrap_or_else(|| "Something went wrong".to_owned())}
                    }
                }
                {back}
            }
        },
    }
}
