use dioxus::prelude::*;
use pixelbooth_core::BoothConfig;
use pixelbooth_io::PhotoBooth;

fn main() {
    dioxus::launch(app);
}

/// Root application component: a header and one passport booth.
fn app() -> Element {
    let config = use_hook(BoothConfig::default);

    rsx! {
        // Tailwind CSS utilities, compiled by build.rs.
        style { dangerous_inner_html: include_str!(env!("TAILWIND_CSS_PATH")) }
        style { dangerous_inner_html: include_str!("../theme.css") }

        div { class: "min-h-screen bg-(--bg) text-(--text) flex flex-col",
            header { class: "px-6 py-4 border-b border-(--border)",
                h1 { class: "text-2xl font-semibold", "pixelbooth" }
                p { class: "text-(--muted) text-sm",
                    "Take a photo and get a pixel-art portrait back"
                }
            }

            main { class: "flex-1 flex items-center justify-center p-6",
                PhotoBooth { config }
            }
        }
    }
}
