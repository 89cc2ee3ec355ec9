use crate::{
    config::Markup,
    error::Result,
    fetch::{Fetch, fetch_document},
    util::clean_text,
};
use lazy_static::lazy_static;
use log::{debug, trace};
use models::{Classification, Course};
use scraper::{ElementRef, Html, Node, Selector};

lazy_static! {
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
}

/// Characters separating a prerequisite's title from its code
const TITLE_SEPARATORS: &[char] = &['(', '[', '-', ':', ','];

/// Predecessors found on a course's detail page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prerequisites {
    pub required: Vec<Course>,
    pub recommended: Vec<Course>,
}

impl Prerequisites {
    fn push(&mut self, classification: Classification, course: Course) {
        match classification {
            Classification::Required => self.required.push(course),
            Classification::Recommended => self.recommended.push(course),
            Classification::None => {}
        }
    }
}

/// Link target of an element: its own `href`, or that of its first link descendant
fn element_link(element: ElementRef) -> Option<String> {
    element
        .value()
        .attr("href")
        .or_else(|| element.select(&LINK).next()?.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Marker classification of a piece of text, if it carries one
fn classify(text: &str, markup: &Markup) -> Option<Classification> {
    if text.contains(&markup.required_marker) {
        Some(Classification::Required)
    } else if text.contains(&markup.recommended_marker) {
        Some(Classification::Recommended)
    } else {
        None
    }
}

/// Extracts a prerequisite stub from a sibling of the marker text.
///
/// # Returns
/// `Some(Course)` if the node carries both a course code and a link target, `None` otherwise
fn parse_sibling(element: ElementRef, text: &str, markup: &Markup) -> Option<Course> {
    let found = markup.code_pattern.find(text)?;
    let page_id = element_link(element)?;

    let title = clean_text(&text[..found.start()]);
    let title = title
        .trim_end_matches(|c: char| c.is_whitespace() || TITLE_SEPARATORS.contains(&c))
        .to_string();

    Some(Course::new(found.as_str(), Some(page_id), title))
}

/// Parent element of the first text node, in document order, that carries a marker
fn find_marker_container<'a>(document: &'a Html, markup: &Markup) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .find(|node| matches!(node.value(), Node::Text(text) if classify(text, markup).is_some()))
        .and_then(|node| node.parent())
        .and_then(ElementRef::wrap)
}

/// Extracts the required and recommended predecessors from a course's detail page.
///
/// The container of the first marker text is walked child by child. A child
/// carrying a marker switches the current classification; any other child
/// carrying a course code and a link is added to the list of the current
/// classification. The classification is never reset, so content following a
/// marker is attributed to it until the next marker.
///
/// # Returns
/// The predecessors, both empty if the page has no marker
pub fn parse_prerequisites(document: &Html, markup: &Markup) -> Prerequisites {
    let mut prerequisites = Prerequisites::default();

    let Some(container) = find_marker_container(document, markup) else {
        return prerequisites;
    };

    let mut state = Classification::None;
    for child in container.children() {
        let (text, element) = match child.value() {
            Node::Text(text) => (text.to_string(), None),
            Node::Element(_) => match ElementRef::wrap(child) {
                Some(element) => (element.text().collect::<String>(), Some(element)),
                None => continue,
            },
            _ => continue,
        };

        if let Some(classification) = classify(&text, markup) {
            trace!("Entering {classification} section");
            state = classification;
            continue;
        }
        if state == Classification::None {
            continue;
        }

        if let Some(course) = element.and_then(|e| parse_sibling(e, &text, markup)) {
            prerequisites.push(state, course);
        }
    }

    prerequisites
}

/// Determines the predecessors of a course unless they are already known.
///
/// Filling is idempotent: a course whose lists are both set is returned
/// untouched without fetching. A course without a detail page gets empty lists.
///
/// # Arguments
/// * `fetcher` - Source of catalog pages
/// * `markup` - Markers and course code pattern of the catalog
/// * `course` - The course to fill
pub async fn fill_prerequisites<F: Fetch>(
    fetcher: &F,
    markup: &Markup,
    course: &mut Course,
) -> Result<()> {
    if course.is_filled() {
        return Ok(());
    }

    let Some(page_id) = course.page_id.as_deref() else {
        debug!("{} has no detail page", course.code);
        course.fill(Vec::new(), Vec::new());
        return Ok(());
    };

    let document = fetch_document(fetcher, page_id).await?;
    let Prerequisites {
        required,
        recommended,
    } = parse_prerequisites(&document, markup);

    debug!(
        "{}: {} required, {} recommended",
        course.code,
        required.len(),
        recommended.len()
    );
    course.fill(required, recommended);

    Ok(())
}
