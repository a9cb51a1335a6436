//! LinkedIn analytics export loading.
//!
//! The export is LinkedIn's workbook (`Content_<from>_<to>_<Author>.xlsx`,
//! or `Contenido_...` for Spanish accounts) with FOLLOWERS and TOP POSTS
//! sheets. The same sheets saved one per CSV file are accepted as well.
//! Headers may be English or Spanish and are preceded by a short preamble.
//! A declared bilingual mapping turns headers into canonical columns once,
//! and the language that matched fixes the date order for the whole sheet.

use super::{parse_date, DateOrder};
use crate::error::PrismaError;
use crate::models::{normalize_url, FollowerObservation};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Canonical column names used by the rest of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    NewFollowers,
    PostUrl,
    PostPublishDate,
    Impressions,
    Engagements,
}

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::NewFollowers => "New followers",
            Column::PostUrl => "Post URL",
            Column::PostPublishDate => "Post publish date",
            Column::Impressions => "Impressions",
            Column::Engagements => "Engagements",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    English,
    Spanish,
}

impl Language {
    fn date_order(self) -> DateOrder {
        match self {
            Language::English => DateOrder::MonthFirst,
            Language::Spanish => DateOrder::DayFirst,
        }
    }
}

/// Header text (compared case-insensitively) to canonical column.
const FIELD_MAP: &[(&str, Column, Language)] = &[
    ("Date", Column::Date, Language::English),
    ("Fecha", Column::Date, Language::Spanish),
    ("New followers", Column::NewFollowers, Language::English),
    ("Nuevos seguidores", Column::NewFollowers, Language::Spanish),
    ("Post URL", Column::PostUrl, Language::English),
    ("URL de la publicación", Column::PostUrl, Language::Spanish),
    ("Post publish date", Column::PostPublishDate, Language::English),
    ("Fecha de publicación", Column::PostPublishDate, Language::Spanish),
    ("Impressions", Column::Impressions, Language::English),
    ("Impresiones", Column::Impressions, Language::Spanish),
    ("Engagements", Column::Engagements, Language::English),
    ("Interacciones", Column::Engagements, Language::Spanish),
];

/// Sheet names, as workbook tabs (`TOP POSTS`) or CSV file suffixes
/// (`..._TOP_POSTS.csv`). Spaces and underscores compare equal.
const FOLLOWER_SHEETS: [&str; 2] = ["FOLLOWERS", "SEGUIDORES"];
const TOP_POST_SHEETS: [&str; 2] = ["TOP_POSTS", "PUBLICACIONES_PRINCIPALES"];

const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

/// How many leading rows are searched for the header.
const MAX_PREAMBLE_ROWS: usize = 10;

fn lookup_header(header: &str) -> Option<(Column, Language)> {
    let header = header.trim().to_lowercase();
    FIELD_MAP
        .iter()
        .find(|(name, _, _)| name.to_lowercase() == header)
        .map(|(_, column, language)| (*column, *language))
}

fn sheet_key(name: &str) -> String {
    name.trim().to_uppercase().replace(' ', "_")
}

fn find_sheet<'a>(names: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find(|name| candidates.contains(&sheet_key(name).as_str()))
        .map(String::as_str)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
}

/// Cell text as the CSV export would show it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) => s.clone(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// A sheet with its header mapped to canonical columns.
#[derive(Debug)]
struct Sheet {
    /// Column positions; a column may repeat (TOP POSTS has two blocks).
    columns: HashMap<Column, Vec<usize>>,
    date_order: DateOrder,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Read `sheets` from a workbook, or the whole file when it is a CSV.
    fn load(path: &Path, sheets: &[&str], sheet_label: &'static str) -> Result<Self, PrismaError> {
        if !path.exists() {
            return Err(PrismaError::MissingInput(format!(
                "analytics file not found: {}",
                path.display()
            )));
        }

        let rows = if is_workbook(path) {
            read_workbook_rows(path, sheets, sheet_label)?
        } else {
            read_csv_rows(path)?
        };
        Self::from_rows(path, rows)
    }

    fn from_rows(path: &Path, mut rows: Vec<Vec<String>>) -> Result<Self, PrismaError> {
        let header_index = rows
            .iter()
            .take(MAX_PREAMBLE_ROWS)
            .position(|r| r.iter().any(|cell| lookup_header(cell).is_some()))
            .ok_or_else(|| {
                PrismaError::MissingInput(format!(
                    "no recognizable header row in {}",
                    path.display()
                ))
            })?;

        let mut columns: HashMap<Column, Vec<usize>> = HashMap::new();
        let mut language = None;
        for (idx, cell) in rows[header_index].iter().enumerate() {
            if let Some((column, lang)) = lookup_header(cell) {
                columns.entry(column).or_default().push(idx);
                language.get_or_insert(lang);
            }
        }
        let language = language.unwrap_or(Language::English);
        debug!(
            "Mapped header of {} ({:?}): {:?}",
            path.display(),
            language,
            columns.keys().map(|c| c.name()).collect::<Vec<_>>()
        );

        Ok(Self {
            columns,
            date_order: language.date_order(),
            rows: rows.split_off(header_index + 1),
        })
    }

    fn require(
        &self,
        path: &Path,
        sheet: &'static str,
        column: Column,
    ) -> Result<&[usize], PrismaError> {
        self.columns
            .get(&column)
            .map(Vec::as_slice)
            .ok_or_else(|| PrismaError::MissingColumn {
                path: path.to_path_buf(),
                sheet,
                column: column.name(),
            })
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, PrismaError> {
    let csv_error = |source| PrismaError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(
    path: &Path,
    sheets: &[&str],
    sheet_label: &'static str,
) -> Result<Vec<Vec<String>>, PrismaError> {
    let workbook_error = |source| PrismaError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let names = workbook.sheet_names();
    let name = find_sheet(&names, sheets)
        .ok_or_else(|| {
            PrismaError::MissingInput(format!(
                "no {} sheet in {} (found: {})",
                sheet_label,
                path.display(),
                names.join(", ")
            ))
        })?
        .to_string();

    debug!("Reading sheet '{}' from {}", name, path.display());
    let range = workbook.worksheet_range(&name).map_err(workbook_error)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Parse a follower count such as `"12"`, `"-3"`, `"1,204"` or `"5.0"`.
fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<i64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().map(|f| f.round() as i64))
}

/// Load the FOLLOWERS sheet as a date-sorted series with one entry per day.
///
/// Rows with an unparseable date are skipped; an empty count is zero;
/// repeated days are summed.
pub fn load_followers(path: &Path) -> Result<Vec<FollowerObservation>, PrismaError> {
    let sheet = Sheet::load(path, &FOLLOWER_SHEETS, "FOLLOWERS")?;
    let date_col = sheet.require(path, "FOLLOWERS", Column::Date)?[0];
    let count_col = sheet.require(path, "FOLLOWERS", Column::NewFollowers)?[0];

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut seen = HashSet::new();
    for row in &sheet.rows {
        let raw_date = cell(row, date_col);
        if raw_date.trim().is_empty() {
            continue;
        }
        let Some(date) = parse_date(raw_date, sheet.date_order) else {
            warn!(value = raw_date, "Skipping follower row with unparseable date");
            continue;
        };
        let count = parse_count(cell(row, count_col)).unwrap_or(0);

        if !seen.insert(date) {
            warn!(%date, "Duplicate follower observation; summing");
        }
        *by_day.entry(date).or_insert(0) += count;
    }

    info!("Loaded {} follower observations from {}", by_day.len(), path.display());

    Ok(by_day
        .into_iter()
        .map(|(date, new_followers)| FollowerObservation {
            date,
            new_followers,
        })
        .collect())
}

/// Load the TOP POSTS sheet as a URL → publish date lookup.
///
/// The sheet holds side-by-side blocks (top by engagements, top by
/// impressions); every `Post URL` column is paired with the publish date
/// column that follows it.
pub fn load_top_posts(path: &Path) -> Result<HashMap<String, NaiveDate>, PrismaError> {
    let sheet = Sheet::load(path, &TOP_POST_SHEETS, "TOP POSTS")?;
    let url_cols = sheet.require(path, "TOP POSTS", Column::PostUrl)?;
    let date_cols = sheet.require(path, "TOP POSTS", Column::PostPublishDate)?;

    let mut dates = HashMap::new();
    for (url_col, date_col) in url_cols.iter().zip(date_cols) {
        for row in &sheet.rows {
            let url = normalize_url(cell(row, *url_col));
            if url.is_empty() {
                continue;
            }
            if let Some(date) = parse_date(cell(row, *date_col), sheet.date_order) {
                dates.entry(url).or_insert(date);
            }
        }
    }

    info!("Loaded {} top post dates from {}", dates.len(), path.display());
    Ok(dates)
}

/// Resolved references to one analytics export.
///
/// Built once per run and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsExport {
    pub followers: PathBuf,
    pub top_posts: Option<PathBuf>,
    pub author: Option<String>,
}

impl AnalyticsExport {
    /// Describe the export a followers file belongs to.
    ///
    /// A workbook carries its own TOP POSTS sheet. A CSV followers sheet
    /// picks up its TOP POSTS sibling when one exists next to it.
    pub fn from_followers(followers: PathBuf) -> Self {
        let stem = followers
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if is_workbook(&followers) {
            let top_posts = workbook_has_sheet(&followers, &TOP_POST_SHEETS)
                .then(|| followers.clone());
            return Self {
                author: author_from_stem(&stem),
                followers,
                top_posts,
            };
        }

        let base = strip_sheet_suffix(&stem, &FOLLOWER_SHEETS).unwrap_or(&stem).to_string();
        let top_posts = followers.parent().and_then(|dir| {
            TOP_POST_SHEETS
                .iter()
                .map(|sheet| dir.join(format!("{base}_{sheet}.csv")))
                .find(|p| p.exists())
        });

        Self {
            author: author_from_stem(&base),
            followers,
            top_posts,
        }
    }

    /// Find the newest analytics workbook or followers sheet in `data_dir`.
    pub fn locate_latest(data_dir: &Path) -> Result<Self, PrismaError> {
        if !data_dir.is_dir() {
            return Err(PrismaError::MissingInput(format!(
                "data directory not found: {}",
                data_dir.display()
            )));
        }

        let newest = WalkDir::new(data_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_workbook(e.path()) || is_followers_sheet(e.path()))
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                Some((e.into_path(), modified))
            })
            .max_by_key(|(_, modified): &(PathBuf, SystemTime)| *modified)
            .map(|(path, _)| path)
            .ok_or_else(|| {
                PrismaError::MissingInput(format!(
                    "no analytics export (*.xlsx, *_FOLLOWERS.csv or *_SEGUIDORES.csv) in {}",
                    data_dir.display()
                ))
            })?;

        info!("Using latest analytics file: {}", newest.display());
        Ok(Self::from_followers(newest))
    }
}

fn workbook_has_sheet(path: &Path, sheets: &[&str]) -> bool {
    match open_workbook_auto(path) {
        Ok(workbook) => find_sheet(&workbook.sheet_names(), sheets).is_some(),
        Err(e) => {
            debug!("Cannot open {}: {}", path.display(), e);
            false
        }
    }
}

fn is_followers_sheet(path: &Path) -> bool {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    is_csv && strip_sheet_suffix(stem, &FOLLOWER_SHEETS).is_some()
}

fn strip_sheet_suffix<'a>(stem: &'a str, sheets: &[&str]) -> Option<&'a str> {
    sheets.iter().find_map(|sheet| {
        let suffix = format!("_{sheet}");
        let split = stem.len().checked_sub(suffix.len())?;
        let tail = stem.get(split..)?;
        if tail.eq_ignore_ascii_case(&suffix) {
            stem.get(..split)
        } else {
            None
        }
    })
}

/// Creator name from an export stem.
///
/// English exports are named `Content_<from>_<to>_<AuthorName>`, Spanish
/// ones `Contenido_<from>_<to>_<Author Name>`. CamelCase names are split
/// into words.
pub fn author_from_stem(stem: &str) -> Option<String> {
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 4 {
        return None;
    }
    let author = split_camel_case(&parts[3..].join(" "));
    let author = author.trim();
    if author.is_empty() {
        None
    } else {
        Some(author.to_string())
    }
}

fn split_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if let Some(p) = prev {
            if p.is_lowercase() && c.is_uppercase() {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_workbook(path: &Path, sheets: Vec<(&str, Vec<Vec<&str>>)>) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (name, rows) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).unwrap();
            for (r, row) in rows.into_iter().enumerate() {
                for (c, value) in row.into_iter().enumerate() {
                    if let Ok(n) = value.parse::<f64>() {
                        sheet.write_number(r as u32, c as u16, n).unwrap();
                    } else if !value.is_empty() {
                        sheet.write_string(r as u32, c as u16, value).unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_load_followers_from_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Content_2024-01-01_2024-01-31_JaneDoe.xlsx");
        write_workbook(
            &path,
            vec![
                ("DISCOVERY", vec![vec!["Overall Performance", "1/1/2024 - 1/31/2024"]]),
                (
                    "FOLLOWERS",
                    vec![
                        vec!["Total followers on 1/31/2024:", "1520"],
                        vec!["", ""],
                        vec!["Date", "New followers"],
                        vec!["1/1/2024", "5"],
                        vec!["1/2/2024", "3"],
                    ],
                ),
                (
                    "TOP POSTS",
                    vec![
                        vec!["Maximum of 50 posts available to include in this list"],
                        vec!["", ""],
                        vec!["Post URL", "Post publish date", "Engagements"],
                        vec!["https://x.com/p/1/", "1/2/2024", "40"],
                    ],
                ),
            ],
        );

        let series = load_followers(&path).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, d(2024, 1, 1));
        assert_eq!(series[0].new_followers, 5);
        assert_eq!(series[1].new_followers, 3);

        let dates = load_top_posts(&path).unwrap();
        assert_eq!(dates.get("https://x.com/p/1"), Some(&d(2024, 1, 2)));

        let export = AnalyticsExport::from_followers(path.clone());
        assert_eq!(export.top_posts, Some(path));
        assert_eq!(export.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_spanish_workbook_sheets_are_day_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Contenido_2024-01-01_2024-01-31_AnaPerez.xlsx");
        write_workbook(
            &path,
            vec![
                (
                    "SEGUIDORES",
                    vec![
                        vec!["Total de seguidores:", "300"],
                        vec!["", ""],
                        vec!["Fecha", "Nuevos seguidores"],
                        vec!["05/01/2024", "4"],
                    ],
                ),
                (
                    "PUBLICACIONES PRINCIPALES",
                    vec![
                        vec!["Máximo de 50 publicaciones"],
                        vec!["", ""],
                        vec!["URL de la publicación", "Fecha de publicación"],
                        vec!["https://x.com/p/9", "07/01/2024"],
                    ],
                ),
            ],
        );

        let series = load_followers(&path).unwrap();
        assert_eq!(series[0].date, d(2024, 1, 5));

        let dates = load_top_posts(&path).unwrap();
        assert_eq!(dates.get("https://x.com/p/9"), Some(&d(2024, 1, 7)));

        let export = AnalyticsExport::locate_latest(dir.path()).unwrap();
        assert_eq!(export.followers, path);
        assert_eq!(export.author.as_deref(), Some("Ana Perez"));
    }

    #[test]
    fn test_workbook_without_followers_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Content_2024_JaneDoe.xlsx");
        write_workbook(&path, vec![("DISCOVERY", vec![vec!["Impressions", "10"]])]);

        let err = load_followers(&path).unwrap_err();
        assert!(matches!(err, PrismaError::MissingInput(_)));
        assert_eq!(AnalyticsExport::from_followers(path).top_posts, None);
    }

    #[test]
    fn test_repeated_zero_day_is_still_summed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x_FOLLOWERS.csv");
        std::fs::write(
            &path,
            "Date,New followers\n1/1/2024,0\n1/1/2024,4\n1/2/2024,1\n",
        )
        .unwrap();

        let series = load_followers(&path).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].new_followers, 4);
    }

    #[test]
    fn test_load_followers_english_with_preamble() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Content_2024-01-01_2024-01-31_JaneDoe_FOLLOWERS.csv");
        std::fs::write(
            &path,
            "Total followers on 1/31/2024:,1520\n\
             ,\n\
             Date,New followers\n\
             1/1/2024,5\n\
             1/2/2024,3\n\
             1/4/2024,\"1,002\"\n\
             ,\n\
             garbage,7\n",
        )
        .unwrap();

        let series = load_followers(&path).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, d(2024, 1, 1));
        assert_eq!(series[0].new_followers, 5);
        assert_eq!(series[2].date, d(2024, 1, 4));
        assert_eq!(series[2].new_followers, 1002);
    }

    #[test]
    fn test_load_followers_spanish_is_day_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Contenido_2024_SEGUIDORES.csv");
        std::fs::write(
            &path,
            "Fecha,Nuevos seguidores\n05/01/2024,4\n06/01/2024,-1\n06/01/2024,2\n",
        )
        .unwrap();

        let series = load_followers(&path).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, d(2024, 1, 5));
        assert_eq!(series[1].date, d(2024, 1, 6));
        assert_eq!(series[1].new_followers, 1);
    }

    #[test]
    fn test_load_followers_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x_FOLLOWERS.csv");
        std::fs::write(&path, "Date,Impressions\n1/1/2024,100\n").unwrap();

        let err = load_followers(&path).unwrap_err();
        assert!(matches!(
            err,
            PrismaError::MissingColumn {
                column: "New followers",
                ..
            }
        ));
    }

    #[test]
    fn test_load_top_posts_reads_both_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x_TOP_POSTS.csv");
        std::fs::write(
            &path,
            "Maximum of 50 posts available to include in this list,,,,,\n\
             ,,,,,\n\
             Post URL,Post publish date,Engagements,Post URL,Post publish date,Impressions\n\
             https://x.com/p/1/,1/2/2024,40,https://x.com/p/2,1/9/2024,900\n\
             https://x.com/p/3,bad,10,https://x.com/p/1,1/2/2024,800\n",
        )
        .unwrap();

        let dates = load_top_posts(&path).unwrap();
        assert_eq!(dates.len(), 2);
        assert_eq!(dates.get("https://x.com/p/1"), Some(&d(2024, 1, 2)));
        assert_eq!(dates.get("https://x.com/p/2"), Some(&d(2024, 1, 9)));
        assert!(!dates.contains_key("https://x.com/p/3"));
    }

    #[test]
    fn test_export_from_followers_finds_sibling_and_author() {
        let dir = TempDir::new().unwrap();
        let followers = dir
            .path()
            .join("Content_2024-01-01_2024-03-31_JaneDoe_FOLLOWERS.csv");
        let top = dir
            .path()
            .join("Content_2024-01-01_2024-03-31_JaneDoe_TOP_POSTS.csv");
        std::fs::write(&followers, "Date,New followers\n").unwrap();
        std::fs::write(&top, "Post URL,Post publish date\n").unwrap();

        let export = AnalyticsExport::from_followers(followers.clone());
        assert_eq!(export.followers, followers);
        assert_eq!(export.top_posts, Some(top));
        assert_eq!(export.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_locate_latest_requires_a_followers_sheet() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.csv"), "a,b\n").unwrap();
        let err = AnalyticsExport::locate_latest(dir.path()).unwrap_err();
        assert!(matches!(err, PrismaError::MissingInput(_)));

        std::fs::write(
            dir.path().join("Contenido_2024-01-01_2024-02-01_Ana_Pérez_SEGUIDORES.csv"),
            "Fecha,Nuevos seguidores\n",
        )
        .unwrap();
        let export = AnalyticsExport::locate_latest(dir.path()).unwrap();
        assert_eq!(export.author.as_deref(), Some("Ana Pérez"));
        assert_eq!(export.top_posts, None);
    }

    #[test]
    fn test_author_from_stem() {
        assert_eq!(
            author_from_stem("Content_2024-01-01_2024-03-31_JohnSmith").as_deref(),
            Some("John Smith")
        );
        assert_eq!(author_from_stem("linkedin_export"), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("-3"), Some(-3));
        assert_eq!(parse_count("1,204"), Some(1204));
        assert_eq!(parse_count("5.0"), Some(5));
        assert_eq!(parse_count(""), None);
    }
}
