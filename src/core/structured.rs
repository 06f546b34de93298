use scraper::{Html, Selector};
use serde_json::Value;

/// Pull every JSON-LD block out of a document and flatten `@graph`
/// containers into one flat list of typed objects.
///
/// Blocks that fail to parse are skipped; these sites routinely ship one
/// well-formed block next to a plugin-mangled one.
pub fn extract_objects(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut objects = Vec::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        flatten_into(value, &mut objects);
    }
    objects
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Object(ref map) => {
            if let Some(graph) = map.get("@graph").and_then(|g| g.as_array()) {
                for item in graph {
                    out.push(item.clone());
                }
            } else {
                out.push(value);
            }
        }
        _ => {}
    }
}

/// First object whose declared `@type` (scalar, or the first element of a
/// type list) is one of `types`.
pub fn first_of_type<'a>(objects: &'a [Value], types: &[&str]) -> Option<&'a Value> {
    objects.iter().find(|object| {
        let declared = match object.get("@type") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(items)) => items.first().and_then(|v| v.as_str()),
            _ => None,
        };
        declared.map(|t| types.contains(&t)).unwrap_or(false)
    })
}

/// Resolve an article's `image` field to a URL string.
///
/// Priority: direct string, object with a `url` field, `@id` reference into
/// the object list, first element of an array.
pub fn image_of(article: &Value, objects: &[Value]) -> Option<String> {
    let image = article.get("image")?;
    resolve_image(image, objects)
}

fn resolve_image(image: &Value, objects: &[Value]) -> Option<String> {
    match image {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            if let Some(url) = map.get("url").and_then(|v| v.as_str()) {
                return Some(url.to_string());
            }
            let reference = map.get("@id").and_then(|v| v.as_str())?;
            let target = objects
                .iter()
                .find(|o| o.get("@id").and_then(|v| v.as_str()) == Some(reference))?;
            target.get("url").and_then(|v| v.as_str()).map(|s| s.to_string())
        }
        Value::Array(items) => resolve_image(items.first()?, objects),
        _ => None,
    }
}

/// `datePublished` / `dateModified` off the first article-like object.
pub fn article_dates(objects: &[Value]) -> (Option<String>, Option<String>) {
    let Some(article) = first_of_type(objects, &["Article", "NewsArticle", "VideoObject", "WebPage"])
    else {
        return (None, None);
    };
    let published = article
        .get("datePublished")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let modified = article
        .get("dateModified")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    (published, modified)
}

/// Keywords / article sections, split on commas when the site packs them
/// into one string.
pub fn article_keywords(objects: &[Value]) -> Vec<String> {
    let Some(article) = first_of_type(objects, &["Article", "NewsArticle", "VideoObject"]) else {
        return Vec::new();
    };
    let mut keywords = Vec::new();
    for field in ["keywords", "articleSection"] {
        match article.get(field) {
            Some(Value::String(s)) => {
                keywords.extend(s.split(',').map(|k| k.trim().to_string()));
            }
            Some(Value::Array(items)) => {
                keywords.extend(items.iter().filter_map(|v| v.as_str()).map(|s| s.to_string()));
            }
            _ => {}
        }
    }
    keywords.retain(|k| !k.is_empty());
    keywords
}
