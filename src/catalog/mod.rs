pub mod delimited;
pub mod json;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, path::PathBuf};

use self::{delimited::parse_delimited, json::parse_json};

#[derive(PartialEq, Clone, Debug)]
pub enum FileType {
    Delimited,
    Json,
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Delimited => write!(f, "DELIMITED"),
            FileType::Json => write!(f, "JSON"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CatalogFile {
    pub file_name: String,
    pub path: PathBuf,
    pub file_type: FileType,
}

impl Display for CatalogFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {{ file_name: {}, path: {} }}",
            self.file_type,
            self.file_name,
            self.path.display()
        )
    }
}

pub fn match_file(path: PathBuf) -> CatalogFile {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_type = if file_name.to_lowercase().ends_with(".json") {
        FileType::Json
    } else {
        FileType::Delimited
    };
    CatalogFile {
        file_name,
        path,
        file_type,
    }
}

/// One movie. The five text attributes are always present; a missing or null
/// value in the source is read as "".
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default, deserialize_with = "empty_if_missing")]
    pub genres: String,
    #[serde(default, deserialize_with = "empty_if_missing")]
    pub keywords: String,
    #[serde(default, deserialize_with = "empty_if_missing")]
    pub tagline: String,
    #[serde(default, deserialize_with = "empty_if_missing")]
    pub cast: String,
    #[serde(default, deserialize_with = "empty_if_missing")]
    pub director: String,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = genres.into();
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = tagline.into();
        self
    }

    pub fn cast(mut self, cast: impl Into<String>) -> Self {
        self.cast = cast.into();
        self
    }

    pub fn director(mut self, director: impl Into<String>) -> Self {
        self.director = director.into();
        self
    }

    /// Joins the text attributes in fixed order: genres, keywords, tagline,
    /// cast, director.
    pub fn document(&self) -> String {
        [
            self.genres.as_str(),
            self.keywords.as_str(),
            self.tagline.as_str(),
            self.cast.as_str(),
            self.director.as_str(),
        ]
        .join(" ")
    }
}

fn empty_if_missing<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct Catalog {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(name: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First row carrying exactly this title.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.title == title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.title.as_str())
    }

    pub fn documents(&self) -> Vec<String> {
        self.entries.iter().map(CatalogEntry::document).collect()
    }
}

impl From<CatalogFile> for Result<Catalog> {
    fn from(file: CatalogFile) -> Result<Catalog> {
        match file.file_type {
            FileType::Delimited => parse_delimited(file),
            FileType::Json => parse_json(file),
        }
    }
}
