use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::errors::{RenderError, WikiError};
use crate::types::Page;
use crate::utils::escape_html;

/// Views the handlers can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    View,
    Edit,
    NotFound,
}

impl View {
    pub const ALL: [View; 4] = [View::Index, View::View, View::Edit, View::NotFound];

    pub fn name(self) -> &'static str {
        match self {
            View::Index => "index",
            View::View => "view",
            View::Edit => "edit",
            View::NotFound => "notfound",
        }
    }
}

/// Data handed to a view
#[derive(Debug, Clone, Copy)]
pub enum ViewData<'a> {
    Page(&'a Page),
    Titles(&'a [String]),
}

/// Template rendering collaborator
pub trait Render: Send + Sync {
    fn render(&self, view: View, data: &ViewData<'_>) -> Result<Vec<u8>, RenderError>;
}

const INDEX_HTML: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Pages</title><link rel=\"stylesheet\" href=\"/css/wiki.css\"></head><body><h1>Pages</h1><ul class=\"listing\">{{PAGES}}</ul></body></html>";
const VIEW_HTML: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title><link rel=\"stylesheet\" href=\"/css/wiki.css\"></head><body><h1>{{TITLE}}</h1><p>[<a href=\"/edit/{{TITLE}}\">edit</a>] [<a href=\"/\">index</a>]</p><div class=\"page-body\">{{BODY}}</div></body></html>";
const EDIT_HTML: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Editing {{TITLE}}</title><link rel=\"stylesheet\" href=\"/css/wiki.css\"></head><body><h1>Editing {{TITLE}}</h1><form action=\"/save/{{TITLE}}\" method=\"POST\"><div><textarea name=\"body\" rows=\"20\" cols=\"80\">{{BODY}}</textarea></div><div><input type=\"submit\" value=\"Save\"></div></form></body></html>";
const NOTFOUND_HTML: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title><link rel=\"stylesheet\" href=\"/css/wiki.css\"></head><body><h1>{{TITLE}}</h1><p>This page does not exist yet. [<a href=\"/edit/{{TITLE}}\">create it</a>]</p></body></html>";

/// Placeholder templates, loaded once at startup
pub struct TemplateComponent {
    index: String,
    view: String,
    edit: String,
    notfound: String,
}

impl TemplateComponent {
    /// Create a template component from the built-in templates
    pub fn new() -> Self {
        Self {
            index: INDEX_HTML.to_string(),
            view: VIEW_HTML.to_string(),
            edit: EDIT_HTML.to_string(),
            notfound: NOTFOUND_HTML.to_string(),
        }
    }

    /// Load `<name>.html` for every view from `dir`.
    ///
    /// A missing file keeps the built-in template; any other read failure is fatal.
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        let mut templates = Self::new();
        for view in View::ALL {
            let path = dir.join(format!("{}.html", view.name()));
            match fs::read_to_string(&path) {
                Ok(source) => {
                    info!("Loaded template {:?}", path);
                    *templates.slot_mut(view) = source;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("No template at {:?}, using built-in {}", path, view.name());
                }
                Err(e) => return Err(WikiError::Io(e)),
            }
        }
        Ok(templates)
    }

    fn slot(&self, view: View) -> &str {
        match view {
            View::Index => &self.index,
            View::View => &self.view,
            View::Edit => &self.edit,
            View::NotFound => &self.notfound,
        }
    }

    fn slot_mut(&mut self, view: View) -> &mut String {
        match view {
            View::Index => &mut self.index,
            View::View => &mut self.view,
            View::Edit => &mut self.edit,
            View::NotFound => &mut self.notfound,
        }
    }
}

impl Default for TemplateComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for TemplateComponent {
    fn render(&self, view: View, data: &ViewData<'_>) -> Result<Vec<u8>, RenderError> {
        let html = match (view, data) {
            (View::Index, ViewData::Titles(titles)) => {
                let mut items = String::new();
                for title in titles.iter() {
                    let escaped = escape_html(title);
                    items.push_str(&format!("<li><a href=\"/view/{}\">{}</a></li>", escaped, escaped));
                }
                self.slot(view).replace("{{PAGES}}", &items)
            }
            (View::View | View::Edit | View::NotFound, ViewData::Page(page)) => {
                // Body last so placeholder text inside a page body is left alone
                let body = escape_html(&String::from_utf8_lossy(&page.body));
                self.slot(view)
                    .replace("{{TITLE}}", &escape_html(page.title.as_str()))
                    .replace("{{BODY}}", &body)
            }
            _ => return Err(RenderError::DataMismatch(view.name())),
        };
        Ok(html.into_bytes())
    }
}
