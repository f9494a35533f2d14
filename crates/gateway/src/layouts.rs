//! Registered slide layout catalog.
//!
//! Layout selection by the LLM is constrained to this catalog; an unknown
//! name falls back to `default` at materialization time. Each template is
//! sli.dev Markdown with `${field}` placeholders; the field schema doubles
//! as the description handed to the content LLM.

use std::collections::BTreeMap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct LayoutTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub template: &'static str,
    /// Field name → description, in template order.
    pub schema: &'static [(&'static str, &'static str)],
}

pub struct LayoutCatalog {
    templates: Vec<LayoutTemplate>,
}

impl LayoutCatalog {
    pub fn contains(&self, name: &str) -> bool {
        self.templates.iter().any(|t| t.name == name)
    }

    /// Unknown names coerce to `default`.
    pub fn get_or_default(&self, name: &str) -> &LayoutTemplate {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| {
                self.templates
                    .iter()
                    .find(|t| t.name == "default")
                    .expect("catalog always registers `default`")
            })
    }

    /// `- Name: 'x', Description: ...` lines for the structure prompt.
    pub fn descriptions(&self) -> String {
        self.templates
            .iter()
            .map(|t| format!("- Name: '{}', Description: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self {
            templates: catalog(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Substitution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Replace every `${field}` with its value; missing fields become empty
/// strings so a materialized slide never leaks a placeholder.
pub fn safe_substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let field = &rest[start + 2..start + 2 + end];
                if let Some(value) = values.get(field) {
                    out.push_str(value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                // Unterminated placeholder: keep the tail verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// The catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn catalog() -> Vec<LayoutTemplate> {
    vec![
        LayoutTemplate {
            name: "default",
            description: "The most basic layout, to display any kind of content.",
            template: "---\nlayout: default\n---\n\n# ${headline}\n\n${content}\n",
            schema: &[
                ("headline", "Title/headline of this slide"),
                ("content", "Main content of the slide. Must be in sli.dev markdown syntax"),
            ],
        },
        LayoutTemplate {
            name: "center",
            description: "Displays the content in the middle of the screen.",
            template: "---\nlayout: center\n---\n\n# ${headline}\n\n${content}\n",
            schema: &[
                ("headline", "Title centered on the slide"),
                ("content", "Main content, centered on the slide"),
            ],
        },
        LayoutTemplate {
            name: "cover",
            description: "Used to display the cover page for the presentation, may contain the presentation title, contextualization, etc.",
            template: "---\nlayout: cover\n---\n\n# ${title}\n\n${subtitle}\n",
            schema: &[
                ("title", "Main presentation title"),
                ("subtitle", "Optional subtitle, author, or contextualization"),
            ],
        },
        LayoutTemplate {
            name: "end",
            description: "The final page for the presentation.",
            template: "---\nlayout: end\n---\n\n# ${message}\n",
            schema: &[("message", "Closing message for the final slide")],
        },
        LayoutTemplate {
            name: "fact",
            description: "To show some fact or data with a lot of prominence on the screen.",
            template: "---\nlayout: fact\n---\n\n# ${fact}\n",
            schema: &[("fact", "A single fact or data point to highlight prominently")],
        },
        LayoutTemplate {
            name: "full",
            description: "Use all the space of the screen to display the content.",
            template: "---\nlayout: full\n---\n\n${content}\n",
            schema: &[("content", "Full-screen content (text, image, or code)")],
        },
        LayoutTemplate {
            name: "image-left",
            description: "Shows an image on the left side of the screen, the content will be placed on the right side.",
            template: "---\nlayout: image-left\nimage: ${image}\nclass: ${class_name}\n---\n\n${content}\n",
            schema: &[
                ("image", "Path or URL to the image"),
                ("class_name", "Optional custom CSS class for the right content"),
                ("content", "Text content shown on the right side"),
            ],
        },
        LayoutTemplate {
            name: "image-right",
            description: "Shows an image on the right side of the screen, the content will be placed on the left side.",
            template: "---\nlayout: image-right\nimage: ${image}\nclass: ${class_name}\n---\n\n${content}\n",
            schema: &[
                ("image", "Path or URL to the image"),
                ("class_name", "Optional custom CSS class for the left content"),
                ("content", "Text content shown on the left side"),
            ],
        },
        LayoutTemplate {
            name: "image",
            description: "Shows an image as the main content of the page.",
            template: "---\nlayout: image\nimage: ${image}\nbackgroundSize: ${background_size}\n---\n",
            schema: &[
                ("image", "Path or URL to the image"),
                ("background_size", "Background size (e.g. 'cover', 'contain', or CSS value)"),
            ],
        },
        LayoutTemplate {
            name: "iframe-left",
            description: "Shows a web page on the left side of the screen, the content will be placed on the right side.",
            template: "---\nlayout: iframe-left\nurl: ${url}\nclass: ${class_name}\n---\n\n${content}\n",
            schema: &[
                ("url", "Web page to embed"),
                ("class_name", "Optional CSS class for the right content"),
                ("content", "Text content shown on the right side"),
            ],
        },
        LayoutTemplate {
            name: "iframe-right",
            description: "Shows a web page on the right side of the screen, the content will be placed on the left side.",
            template: "---\nlayout: iframe-right\nurl: ${url}\nclass: ${class_name}\n---\n\n${content}\n",
            schema: &[
                ("url", "Web page to embed"),
                ("class_name", "Optional CSS class for the left content"),
                ("content", "Text content shown on the left side"),
            ],
        },
        LayoutTemplate {
            name: "iframe",
            description: "Shows a web page as the main content of the page.",
            template: "---\nlayout: iframe\nurl: ${url}\n---\n",
            schema: &[("url", "Web page to embed as the main content")],
        },
        LayoutTemplate {
            name: "intro",
            description: "To introduce the presentation, usually with the presentation title, a short description, the author, etc.",
            template: "---\nlayout: intro\n---\n\n# ${title}\n\n${description}\n\n_Author: ${author}_\n",
            schema: &[
                ("title", "Presentation title"),
                ("description", "Short description"),
                ("author", "Author name(s)"),
            ],
        },
        LayoutTemplate {
            name: "none",
            description: "A layout without any existing styling.",
            template: "---\nlayout: none\n---\n\n${content}\n",
            schema: &[("content", "Raw content without styling")],
        },
        LayoutTemplate {
            name: "quote",
            description: "To display a quotation with prominence.",
            template: "---\nlayout: quote\n---\n\n> ${quote}\n\n— ${author}\n",
            schema: &[
                ("quote", "Quotation text"),
                ("author", "Source or author"),
            ],
        },
        LayoutTemplate {
            name: "section",
            description: "Used to mark the beginning of a new presentation section.",
            template: "---\nlayout: section\n---\n\n# ${section_title}\n",
            schema: &[("section_title", "Section heading")],
        },
        LayoutTemplate {
            name: "statement",
            description: "Make an affirmation/statement as the main page content.",
            template: "---\nlayout: statement\n---\n\n# ${statement}\n",
            schema: &[("statement", "Main affirmation or statement")],
        },
        LayoutTemplate {
            name: "two-cols",
            description: "Separates the page content in two columns.",
            template: "---\nlayout: two-cols\n---\n\n# ${title_left}\n\n${left}\n\n::right::\n\n# ${title_right}\n\n${right}\n",
            schema: &[
                ("title_left", "Heading for the left column"),
                ("left", "Content for the left column"),
                ("title_right", "Heading for the right column"),
                ("right", "Content for the right column"),
            ],
        },
        LayoutTemplate {
            name: "two-cols-header",
            description: "Separates the upper and lower lines of the page content, and the second line separates the left and right columns.",
            template: "---\nlayout: two-cols-header\n---\n\n${header}\n\n::left::\n\n# ${title_left}\n\n${left}\n\n::right::\n\n# ${title_right}\n\n${right}\n",
            schema: &[
                ("header", "Header spanning the top"),
                ("title_left", "Heading for the left column"),
                ("left", "Content for the left column"),
                ("title_right", "Heading for the right column"),
                ("right", "Content for the right column"),
            ],
        },
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
