use std::fmt;

use serde::{Deserialize, Serialize};

/// A course as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub section: String,
}

/// A single downloadable file attached to a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectableItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub path: String,
}

impl SelectableItem {
    pub fn category(&self) -> Category {
        Category::of(self)
    }
}

/// File categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Video,
    Pdf,
    Document,
    Presentation,
    Image,
    Other,
}

impl Category {
    /// First matching rule wins.
    pub fn of(item: &SelectableItem) -> Self {
        let mime = item.mime_type.as_deref().unwrap_or_default();

        if mime.contains("video") {
            Category::Video
        } else if mime.contains("pdf") {
            Category::Pdf
        } else if mime.contains("word") || mime.contains("document") {
            Category::Document
        } else if mime.contains("presentation")
            || mime.contains("powerpoint")
            || item.name.ends_with(".ppt")
            || item.name.ends_with(".pptx")
        {
            Category::Presentation
        } else if mime.contains("image") {
            Category::Image
        } else {
            Category::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Video => "Videos",
            Category::Pdf => "PDFs",
            Category::Document => "Documents",
            Category::Presentation => "Presentations",
            Category::Image => "Images",
            Category::Other => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
