use crate::{
    config::Markup,
    error::Result,
    fetch::{Fetch, fetch_document},
    util::clean_text,
};
use lazy_static::lazy_static;
use log::{info, trace};
use models::Course;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref CELL: Selector = Selector::parse("td").unwrap();
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
}

/// Page identifier of a subject's course list (e.g. `easc` -> `cx_sb_easc.htm`)
pub fn subject_page_id(subject: &str) -> String {
    format!("cx_sb_{}.htm", subject.trim().to_lowercase())
}

/// Extracts a course from a table row of a subject page.
///
/// The row needs at least three cells: the first cell's text starts with the
/// course code and the third cell links to the course's detail page.
///
/// # Returns
/// `Some(Course)` with undetermined prerequisites, `None` if the row does not describe a course
fn parse_row(row: ElementRef, markup: &Markup) -> Option<Course> {
    let cells: Vec<ElementRef> = row.select(&CELL).collect();
    let [first, _, third, ..] = cells.as_slice() else {
        return None;
    };

    let first_text = first.text().collect::<String>();
    let code = markup
        .code_pattern
        .find(first_text.trim_start())
        .filter(|m| m.start() == 0)?
        .as_str()
        .to_string();

    let link = third.select(&LINK).next()?;
    let href = link.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    let title = clean_text(&link.text().collect::<String>());

    Some(Course::new(code, Some(href.to_string()), title))
}

/// Extracts every course listed in the tables of a subject page
///
/// Rows that are not course entries (headers, malformed rows, rows without a
/// link) are skipped.
pub fn parse_subject_page(document: &Html, markup: &Markup) -> Vec<Course> {
    document
        .select(&ROW)
        .filter_map(|row| {
            let course = parse_row(row, markup);
            if course.is_none() {
                trace!("Skipping row: {}", clean_text(&row.text().collect::<String>()));
            }
            course
        })
        .collect()
}

/// Fetches a subject page and lists its courses
///
/// # Arguments
/// * `fetcher` - Source of catalog pages
/// * `markup` - Course code pattern of the catalog
/// * `subject_page_id` - Page identifier of the subject list
///
/// # Returns
/// The listed courses in page order, with undetermined prerequisites
pub async fn list_courses<F: Fetch>(
    fetcher: &F,
    markup: &Markup,
    subject_page_id: &str,
) -> Result<Vec<Course>> {
    let document = fetch_document(fetcher, subject_page_id).await?;
    let courses = parse_subject_page(&document, markup);

    info!("Found {} courses on {subject_page_id}", courses.len());
    Ok(courses)
}
