//! Import of Markdown drafts into editor markup.

use comrak::{Options, markdown_to_html};

/// Convert a Markdown draft into the markup the editor works on.
///
/// Raw inline HTML (such as previously applied spans) is passed through, and
/// smart punctuation is off so bracket and brace placeholders survive as
/// written.
pub fn markdown_to_markup(markdown: &str) -> String {
    markdown_to_html(markdown, &import_options())
}

fn import_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = false;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options.parse.smart = false;

    options.render.hardbreaks = false;
    options.render.unsafe_ = true;

    options
}
