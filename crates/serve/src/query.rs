// crates/serve/src/query.rs
//
// CMS collection queries, encoded in the bracket syntax the REST API parses
// (`filters[slug][$eq]=about&populate[seoImage][fields][0]=url`).

use form_urlencoded::Serializer;

pub const MEDIA_FIELDS: [&str; 5] = ["url", "alternativeText", "width", "height", "formats"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationState {
    #[default]
    Live,
    Preview,
}

impl PublicationState {
    pub fn from_draft(draft: bool) -> Self {
        if draft {
            PublicationState::Preview
        } else {
            PublicationState::Live
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PublicationState::Live => "live",
            PublicationState::Preview => "preview",
        }
    }

    /// Same choice in the document-status vocabulary of newer CMS versions.
    pub fn status(self) -> &'static str {
        match self {
            PublicationState::Live => "published",
            PublicationState::Preview => "draft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    path: Vec<String>,
    op: &'static str,
    values: Vec<String>,
}

/// Population of one relation, with its own projection and sub-relations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Populate {
    relation: String,
    fields: Vec<String>,
    nested: Vec<Populate>,
    everything: bool,
}

impl Populate {
    pub fn new(relation: impl Into<String>) -> Self {
        Populate {
            relation: relation.into(),
            ..Populate::default()
        }
    }

    /// Populate every first-level relation of this one (`populate=*`).
    pub fn all(relation: impl Into<String>) -> Self {
        Populate {
            everything: true,
            ..Populate::new(relation)
        }
    }

    pub fn media(relation: impl Into<String>) -> Self {
        Populate::new(relation).fields(MEDIA_FIELDS)
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with(mut self, nested: Populate) -> Self {
        self.nested.push(nested);
        self
    }

    fn encode(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        let key = format!("{prefix}[{}]", self.relation);
        if self.everything && self.fields.is_empty() && self.nested.is_empty() {
            out.push((format!("{key}[populate]"), "*".into()));
            return;
        }
        if self.fields.is_empty() && self.nested.is_empty() {
            out.push((key, "true".into()));
            return;
        }
        for (i, f) in self.fields.iter().enumerate() {
            out.push((format!("{key}[fields][{i}]"), f.clone()));
        }
        for n in &self.nested {
            n.encode(&format!("{key}[populate]"), out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    filters: Vec<Filter>,
    fields: Vec<String>,
    populate: Vec<Populate>,
    locale: Option<String>,
    publication: Option<PublicationState>,
    sort: Vec<String>,
    limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// `field` may be a dotted path through relations (`categories.slug`).
    pub fn filter_eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            path: field.split('.').map(str::to_string).collect(),
            op: "$eq",
            values: vec![value.into()],
        });
        self
    }

    pub fn filter_in<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter {
            path: field.split('.').map(str::to_string).collect(),
            op: "$in",
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate.push(populate);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn publication(mut self, state: PublicationState) -> Self {
        self.publication = Some(state);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn locale_value(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Decoded key/value pairs in emission order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();

        for f in &self.filters {
            let base = f
                .path
                .iter()
                .fold(String::from("filters"), |acc, p| format!("{acc}[{p}]"));
            if f.op == "$in" {
                for (i, v) in f.values.iter().enumerate() {
                    out.push((format!("{base}[$in][{i}]"), v.clone()));
                }
            } else if let Some(v) = f.values.first() {
                out.push((format!("{base}[{}]", f.op), v.clone()));
            }
        }

        for (i, f) in self.fields.iter().enumerate() {
            out.push((format!("fields[{i}]"), f.clone()));
        }

        for p in &self.populate {
            p.encode("populate", &mut out);
        }

        for (i, s) in self.sort.iter().enumerate() {
            out.push((format!("sort[{i}]"), s.clone()));
        }
        if let Some(limit) = self.limit {
            out.push(("pagination[limit]".into(), limit.to_string()));
        }
        if let Some(locale) = &self.locale {
            out.push(("locale".into(), locale.clone()));
        }
        if let Some(state) = self.publication {
            out.push(("publicationState".into(), state.as_str().into()));
            out.push(("status".into(), state.status().into()));
        }
        out
    }

    pub fn to_query_string(&self) -> String {
        let mut ser = Serializer::new(String::new());
        for (k, v) in self.pairs() {
            ser.append_pair(&k, &v);
        }
        ser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(pairs: &[(String, String)], k: &str, v: &str) -> bool {
        pairs.iter().any(|(pk, pv)| pk == k && pv == v)
    }

    #[test]
    fn page_query_pairs() {
        let q = Query::new()
            .filter_eq("slug", "about")
            .fields(["title", "slug"])
            .populate(Populate::new("sections").with(Populate::media("image")))
            .populate(Populate::new("localizations").fields(["slug", "locale"]))
            .locale("fr")
            .publication(PublicationState::Preview);
        let pairs = q.pairs();
        assert!(has(&pairs, "filters[slug][$eq]", "about"));
        assert!(has(&pairs, "fields[1]", "slug"));
        assert!(has(&pairs, "populate[sections][populate][image][fields][0]", "url"));
        assert!(has(&pairs, "populate[localizations][fields][1]", "locale"));
        assert!(has(&pairs, "locale", "fr"));
        assert!(has(&pairs, "publicationState", "preview"));
        assert!(has(&pairs, "status", "draft"));
    }

    #[test]
    fn nested_filters_sort_and_limit() {
        let pairs = Query::new()
            .filter_in("categories.slug", ["web", "print"])
            .filter_eq("featured", "true")
            .sort("order:asc")
            .sort("createdAt:desc")
            .limit(12)
            .pairs();
        assert!(has(&pairs, "filters[categories][slug][$in][1]", "print"));
        assert!(has(&pairs, "filters[featured][$eq]", "true"));
        assert!(has(&pairs, "sort[1]", "createdAt:desc"));
        assert!(has(&pairs, "pagination[limit]", "12"));
    }

    #[test]
    fn populate_shorthands() {
        let pairs = Query::new()
            .populate(Populate::all("blocks"))
            .populate(Populate::new("logo"))
            .pairs();
        assert!(has(&pairs, "populate[blocks][populate]", "*"));
        assert!(has(&pairs, "populate[logo]", "true"));
    }

    #[test]
    fn query_string_round_trips_through_decoder() {
        let q = Query::new().filter_eq("slug", "a b&c").locale("en");
        let qs = q.to_query_string();
        let decoded: Vec<(String, String)> = form_urlencoded::parse(qs.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(decoded, q.pairs());
    }
}
