//! Photo upload button with drag-and-drop.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use pixelbooth_core::DataUrl;
use pixelbooth_core::data_url::{media_type_for_filename, upload_accept};

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the photo as a data URL.
    on_upload: EventHandler<DataUrl>,
}

/// A file picker that also accepts a dropped image.
///
/// Only the extensions in
/// [`IMAGE_EXTENSIONS`](pixelbooth_core::data_url::IMAGE_EXTENSIONS) are
/// accepted. The chosen file is read and handed to `on_upload` as a
/// base64 data URL.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        let Some(media_type) = media_type_for_filename(&name) else {
            error.set(Some(format!("Not an image: {name}")));
            return;
        };
        let bytes = match file.read_bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error.set(Some(format!("Failed to read file: {e}")));
                return;
            }
        };
        match DataUrl::encode(media_type, &bytes) {
            Ok(url) => {
                error.set(None);
                props.on_upload.call(url);
            }
            Err(e) => error.set(Some(format!("{name}: {e}"))),
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let ring = if dragging() {
        "ring-2 ring-[var(--border-accent)]"
    } else {
        ""
    };

    rsx! {
        div {
            class: "flex flex-col items-center gap-1 rounded {ring}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| dragging.set(false),
            ondrop: handle_drop,

            label {
                class: "inline-flex items-center gap-2 px-4 py-2 rounded font-medium transition-colors bg-[var(--btn-secondary)] hover:bg-[var(--btn-secondary-hover)] text-[var(--text)] cursor-pointer",
                input {
                    r#type: "file",
                    accept: upload_accept(),
                    class: "hidden",
                    onchange: handle_files,
                }
                Icon { width: 18, height: 18, icon: LdUpload }
                "Upload"
            }

            if let Some(ref err) = error() {
                p { class: "text-[var(--text-error)] text-xs", "{err}" }
            }
        }
    }
}
