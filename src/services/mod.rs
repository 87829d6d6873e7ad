pub mod catalog_service;
pub mod exhibition_service;
pub mod fact_service;
pub mod item_service;
pub mod stats_service;
pub mod user_service;

pub use catalog_service::CatalogService;
pub use exhibition_service::ExhibitionService;
pub use fact_service::FactService;
pub use item_service::ItemService;
pub use stats_service::StatsService;
pub use user_service::UserService;

/// `%q%` for ILIKE, or `None` when there is nothing to match.
pub(crate) fn like_pattern(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{}%", q))
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn blank_query_matches_everything() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(Some("tea")), Some("%tea%".to_string()));
    }
}
