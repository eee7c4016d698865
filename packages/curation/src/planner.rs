//! Query planning.
//!
//! Expands the static brand/model/category tables into the run's search
//! queries. Order and count are fixed functions of the tables: no
//! randomness, so two runs against the same tables plan identical batches.

use crate::types::{Priority, QueryCategory, SearchQuery};

/// Brands under curation, with their official store domains.
pub const BRANDS: &[(&str, &str)] = &[
    ("Nike", "nike.com"),
    ("Adidas", "adidas.com"),
    ("ASICS", "asics.com"),
    ("Saucony", "saucony.com"),
    ("Brooks", "brooksrunning.com"),
    ("New Balance", "newbalance.com"),
    ("Mizuno", "mizuno.com"),
    ("Hoka", "hoka.com"),
    ("On", "on.com"),
];

/// Review sites worth restricting searches to, best first.
pub const REVIEW_SITES: &[&str] = &[
    "runrepeat.com",
    "runnersworld.com",
    "believeintherun.com",
    "theruntesters.com",
    "irunfar.com",
    "roadtrailrun.com",
    "solereview.com",
    "runningwarehouse.com",
];

/// Ranked popular model lines per brand.
pub const POPULAR_MODELS: &[(&str, &[&str])] = &[
    (
        "Nike",
        &["Pegasus", "Vaporfly", "Alphafly", "ZoomX", "Invincible", "Structure", "React"],
    ),
    (
        "Adidas",
        &["Ultraboost", "Adizero", "Boston", "Solarboost", "Terrex", "Takumi"],
    ),
    (
        "ASICS",
        &["Gel-Nimbus", "Gel-Kayano", "Novablast", "Superblast", "Gel-Cumulus", "Metaspeed"],
    ),
    (
        "Saucony",
        &["Endorphin", "Triumph", "Ride", "Kinvara", "Peregrine", "Guide"],
    ),
    (
        "Brooks",
        &["Ghost", "Glycerin", "Adrenaline", "Launch", "Hyperion", "Cascadia"],
    ),
    (
        "New Balance",
        &["1080", "880", "FuelCell", "Fresh Foam", "Hierro", "Rebel"],
    ),
    (
        "Mizuno",
        &["Wave Rider", "Wave Sky", "Wave Inspire", "Wave Creation", "Daichi"],
    ),
    (
        "Hoka",
        &["Clifton", "Bondi", "Speedgoat", "Mach", "Rincon", "Arahi"],
    ),
    (
        "On",
        &["Cloudrunner", "Cloudmonster", "Cloudflow", "Cloudsurfer", "Cloudventure"],
    ),
];

const GENERIC_KEYWORDS: &[&str] = &["review", "test", "best"];
const USAGE_CATEGORIES: &[&str] = &["daily trainer", "racing", "trail"];
const SITE_QUERY_COUNT: usize = 4;
const MODEL_QUERY_COUNT: usize = 3;

/// Plan the queries for one brand.
///
/// Per brand: three generic keyword searches and four site-restricted
/// searches (high priority), then up to three top-model searches and
/// three usage-category searches (medium priority).
pub fn plan_brand_queries(brand: &str) -> Vec<SearchQuery> {
    let mut queries = Vec::new();

    for keyword in GENERIC_KEYWORDS {
        queries.push(SearchQuery {
            text: format!("{brand} running shoes {keyword}"),
            category: QueryCategory::Review,
            priority: Priority::High,
            brand: Some(brand.to_string()),
        });
    }

    for site in REVIEW_SITES.iter().take(SITE_QUERY_COUNT) {
        queries.push(SearchQuery {
            text: format!("site:{site} {brand} running shoes"),
            category: QueryCategory::Review,
            priority: Priority::High,
            brand: Some(brand.to_string()),
        });
    }

    if let Some((_, models)) = POPULAR_MODELS.iter().find(|(name, _)| *name == brand) {
        for model in models.iter().take(MODEL_QUERY_COUNT) {
            queries.push(SearchQuery {
                text: format!("{brand} {model} running shoe review"),
                category: QueryCategory::ModelSpecific,
                priority: Priority::Medium,
                brand: Some(brand.to_string()),
            });
        }
    }

    for usage in USAGE_CATEGORIES {
        queries.push(SearchQuery {
            text: format!("{brand} {usage} running shoes review"),
            category: QueryCategory::UsageSpecific,
            priority: Priority::Medium,
            brand: Some(brand.to_string()),
        });
    }

    queries
}

/// Plan the full batch across every brand.
pub fn plan_all_queries() -> Vec<SearchQuery> {
    BRANDS
        .iter()
        .flat_map(|(brand, _)| plan_brand_queries(brand))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_plan_has_expected_shape() {
        let queries = plan_brand_queries("Nike");
        // 3 generic + 4 site + 3 model + 3 usage
        assert_eq!(queries.len(), 13);

        let high: Vec<_> = queries
            .iter()
            .filter(|q| q.priority == Priority::High)
            .collect();
        assert_eq!(high.len(), 7);

        assert!(queries[0].text.contains("review"));
        assert!(queries[3].text.starts_with("site:runrepeat.com"));
        assert!(queries
            .iter()
            .any(|q| q.category == QueryCategory::ModelSpecific && q.text.contains("Pegasus")));
        assert!(queries
            .iter()
            .any(|q| q.category == QueryCategory::UsageSpecific && q.text.contains("trail")));
    }

    #[test]
    fn unknown_brand_skips_model_queries() {
        let queries = plan_brand_queries("Altra");
        assert_eq!(queries.len(), 10);
        assert!(queries
            .iter()
            .all(|q| q.category != QueryCategory::ModelSpecific));
    }

    #[test]
    fn full_plan_is_deterministic() {
        let first = plan_all_queries();
        let second = plan_all_queries();
        assert_eq!(first, second);
        // Every brand contributes 13 queries.
        assert_eq!(first.len(), BRANDS.len() * 13);
    }

    #[test]
    fn every_query_carries_its_brand() {
        for query in plan_all_queries() {
            let brand = query.brand.as_deref().unwrap();
            assert!(query.text.contains(brand));
        }
    }
}
