use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    Asc,
    #[default]
    Desc,
}

impl FeedSort {
    /// Never interpolate user input into SQL ordering, so the storage
    /// layer maps the enum to a fixed keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            FeedSort::Asc => "ASC",
            FeedSort::Desc => "DESC",
        }
    }
}

/// Pagination and filtering for the user feed, parsed from the query
/// string. Tags come in as a single comma separated parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFeedQuery")]
pub struct FeedQuery {
    pub limit: i64,
    pub offset: i64,
    pub sort: FeedSort,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFeedQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<FeedSort>,
    tags: Option<String>,
    search: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        FeedQuery {
            limit: 10,
            offset: 0,
            sort: FeedSort::Desc,
            tags: Vec::new(),
            search: None,
        }
    }
}

impl TryFrom<RawFeedQuery> for FeedQuery {
    type Error = String;

    fn try_from(raw: RawFeedQuery) -> Result<Self, Self::Error> {
        let defaults = FeedQuery::default();
        let limit = raw.limit.unwrap_or(defaults.limit);
        if !(1..=20).contains(&limit) {
            return Err("limit must be between 1 and 20".to_string());
        }
        let offset = raw.offset.unwrap_or(defaults.offset);
        if offset < 0 {
            return Err("offset must not be negative".to_string());
        }
        let tags: Vec<String> = raw
            .tags
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if tags.len() > 5 {
            return Err("at most 5 tags may be given".to_string());
        }
        if let Some(search) = &raw.search {
            if search.chars().count() > 100 {
                return Err("search must not exceed 100 characters".to_string());
            }
        }
        Ok(FeedQuery {
            limit,
            offset,
            sort: raw.sort.unwrap_or(defaults.sort),
            tags,
            search: raw.search,
        })
    }
}
