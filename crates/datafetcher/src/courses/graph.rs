use crate::{
    config::Markup,
    courses::prerequisites::fill_prerequisites,
    error::Result,
    fetch::Fetch,
};
use log::{debug, info};
use models::{Classification, Course, Registry};

/// Predecessors of `course` whose codes are not registered yet: required ones
/// first, then recommended ones, each in document order
fn unregistered_predecessors(course: &Course, registry: &Registry) -> Vec<Course> {
    [Classification::Required, Classification::Recommended]
        .into_iter()
        .flat_map(|classification| course.predecessors(classification))
        .filter(|predecessor| !registry.contains(&predecessor.code))
        .cloned()
        .collect()
}

/// Fills a course, registers it and returns the predecessors still to visit
async fn visit<F: Fetch>(
    fetcher: &F,
    markup: &Markup,
    mut course: Course,
    registry: &mut Registry,
    recurse: bool,
) -> Result<Vec<Course>> {
    fill_prerequisites(fetcher, markup, &mut course).await?;

    // Registry membership is checked before scheduling; a course never schedules itself
    let pending = if recurse {
        let mut pending = unregistered_predecessors(&course, registry);
        pending.retain(|p| p.code != course.code);
        pending
    } else {
        Vec::new()
    };

    debug!("Visited {course} ({} new predecessors)", pending.len());
    registry.insert(course);

    Ok(pending)
}

/// Builds the deduplicated course registry starting from `seeds`.
///
/// Each seed has its prerequisites filled and is registered unless its code is
/// already present (first write wins). With `recurse`, predecessors that are
/// not registered yet are visited the same way, depth first, required before
/// recommended. The walk keeps an explicit stack instead of recursing, and a
/// predecessor already registered by the time it is reached is skipped, which
/// makes cyclic prerequisites terminate.
///
/// # Arguments
/// * `fetcher` - Source of catalog pages
/// * `markup` - Markers and course code pattern of the catalog
/// * `seeds` - Courses to start from, visited in order
/// * `registry` - Registry to extend; existing entries are never replaced
/// * `recurse` - Whether to visit predecessors of the seeds
///
/// # Returns
/// The extended registry
pub async fn build_graph<F: Fetch>(
    fetcher: &F,
    markup: &Markup,
    seeds: Vec<Course>,
    mut registry: Registry,
    recurse: bool,
) -> Result<Registry> {
    let initial = registry.len();

    for seed in seeds {
        let mut stack = visit(fetcher, markup, seed, &mut registry, recurse).await?;
        stack.reverse();

        while let Some(course) = stack.pop() {
            if registry.contains(&course.code) {
                continue;
            }

            let pending = visit(fetcher, markup, course, &mut registry, recurse).await?;
            stack.extend(pending.into_iter().rev());
        }
    }

    info!(
        "Registry holds {} courses ({} new)",
        registry.len(),
        registry.len() - initial
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MemoryFetcher;
    use std::collections::HashSet;

    fn page(required: &[&str], recommended: &[&str]) -> String {
        let links = |codes: &[&str]| {
            codes
                .iter()
                .map(|code| format!("<a href='{code}.htm'>Course {code}</a> "))
                .collect::<String>()
        };
        format!(
            "<table><tr><td>MUST: {}<br/>RECOMMEND: {}</td></tr></table>",
            links(required),
            links(recommended)
        )
    }

    fn seed(code: &str) -> Course {
        Course::new(code, Some(format!("{code}.htm")), format!("Course {code}"))
    }

    fn codes(registry: &Registry) -> Vec<&str> {
        registry.codes().collect()
    }

    #[tokio::test]
    async fn test_without_recursion() {
        let fetcher = MemoryFetcher::new()
            .with_page(
                "p1",
                "<td>... MUST: <a href='p2'>Intro Physics PHYS1001</a> \
                 RECOMMEND: <a href='p3'>Intro Maths MATH1001</a> ...</td>",
            );
        let seeds = vec![Course::new("EASC1001", Some("p1".into()), "Earth")];

        let registry = build_graph(&fetcher, &Markup::default(), seeds, Registry::new(), false)
            .await
            .unwrap();

        assert_eq!(codes(&registry), ["EASC1001"]);
        let course = registry.get("EASC1001").unwrap();
        assert_eq!(course.required_codes().collect::<Vec<_>>(), ["PHYS1001"]);
        assert_eq!(course.recommended_codes().collect::<Vec<_>>(), ["MATH1001"]);
        assert_eq!(fetcher.requests(), ["p1"]);
    }

    #[tokio::test]
    async fn test_mutual_prerequisites_terminate() {
        let fetcher = MemoryFetcher::new()
            .with_page("AAAA1000.htm", &page(&["BBBB1000"], &[]))
            .with_page("BBBB1000.htm", &page(&["AAAA1000"], &[]));

        let registry = build_graph(
            &fetcher,
            &Markup::default(),
            vec![seed("AAAA1000")],
            Registry::new(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(codes(&registry), ["AAAA1000", "BBBB1000"]);
        assert!(registry.iter().all(Course::is_filled));
    }

    #[tokio::test]
    async fn test_self_reference_terminates() {
        let fetcher =
            MemoryFetcher::new().with_page("AAAA1000.htm", &page(&["AAAA1000"], &["AAAA1000"]));

        let registry = build_graph(
            &fetcher,
            &Markup::default(),
            vec![seed("AAAA1000")],
            Registry::new(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(codes(&registry), ["AAAA1000"]);
        assert_eq!(fetcher.requests(), ["AAAA1000.htm"]);
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        // A requires B and C, recommends D; B requires C and E
        let fetcher = MemoryFetcher::new()
            .with_page("AAAA1000.htm", &page(&["BBBB1000", "CCCC1000"], &["DDDD1000"]))
            .with_page("BBBB1000.htm", &page(&["CCCC1000", "EEEE1000"], &[]))
            .with_page("CCCC1000.htm", &page(&[], &[]))
            .with_page("DDDD1000.htm", &page(&[], &["AAAA1000"]))
            .with_page("EEEE1000.htm", &page(&[], &[]));

        let registry = build_graph(
            &fetcher,
            &Markup::default(),
            vec![seed("AAAA1000")],
            Registry::new(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(
            codes(&registry),
            ["AAAA1000", "BBBB1000", "CCCC1000", "EEEE1000", "DDDD1000"]
        );
        // Every page is fetched once
        let requests = fetcher.requests();
        let unique: HashSet<_> = requests.iter().collect();
        assert_eq!(requests.len(), unique.len());
    }

    #[tokio::test]
    async fn test_codes_are_unique() {
        let fetcher = MemoryFetcher::new()
            .with_page("AAAA1000.htm", &page(&["CCCC1000"], &["CCCC1000"]))
            .with_page("BBBB1000.htm", &page(&["CCCC1000", "AAAA1000"], &[]))
            .with_page("CCCC1000.htm", &page(&["BBBB1000"], &[]));

        let seeds = vec![seed("AAAA1000"), seed("BBBB1000"), seed("AAAA1000")];
        let registry = build_graph(&fetcher, &Markup::default(), seeds, Registry::new(), true)
            .await
            .unwrap();

        let all: Vec<_> = codes(&registry);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all, ["AAAA1000", "CCCC1000", "BBBB1000"]);
    }

    #[tokio::test]
    async fn test_inherited_registry_takes_precedence() {
        let fetcher = MemoryFetcher::new()
            .with_page("AAAA1000.htm", &page(&["BBBB1000"], &[]))
            .with_page("BBBB1000.htm", &page(&[], &[]));

        let mut existing = seed("BBBB1000");
        existing.title = "Registered first".into();
        existing.fill(Vec::new(), Vec::new());
        let inherited: Registry = [existing].into_iter().collect();

        let registry = build_graph(
            &fetcher,
            &Markup::default(),
            vec![seed("AAAA1000")],
            inherited,
            true,
        )
        .await
        .unwrap();

        assert_eq!(codes(&registry), ["BBBB1000", "AAAA1000"]);
        assert_eq!(registry.get("BBBB1000").unwrap().title, "Registered first");
        assert_eq!(fetcher.requests(), ["AAAA1000.htm"]);
    }

    #[tokio::test]
    async fn test_filled_seeds_are_not_fetched() {
        let fetcher = MemoryFetcher::new();
        let mut course = seed("AAAA1000");
        course.fill(Vec::new(), Vec::new());

        let registry = build_graph(&fetcher, &Markup::default(), vec![course], Registry::new(), true)
            .await
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(fetcher.requests().is_empty());
    }
}
